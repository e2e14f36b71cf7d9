//! 持久化 Store
//!
//! 两个集合各自对应数据目录下的一个 JSON 数组文件：
//!
//! | 集合 | 默认文件 | 元素 |
//! |------|----------|------|
//! | [`Collection::ConversationHistory`] | `conversation_history.json` | `{ "role", "content" }` |
//! | [`Collection::TodoItems`] | `todo_list.json` | 字符串 |
//!
//! 读取永远不会失败：文件缺失、为空或无法解析都按空集合处理并记录警告。
//! 写入是整体覆盖，失败只记日志，由调用方决定是否在意返回值。

use crate::error::{MemoryError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const DEFAULT_HISTORY_FILE: &str = "conversation_history.json";
pub const DEFAULT_TODO_FILE: &str = "todo_list.json";

/// Store 管理的集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    ConversationHistory,
    TodoItems,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::ConversationHistory => "conversation-history",
            Collection::TodoItems => "todo-items",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 基于 JSON 文件的集合存储，只保存路径，本身不缓存数据
#[derive(Debug, Clone)]
pub struct PersistentStore {
    data_dir: PathBuf,
    history_path: PathBuf,
    todo_path: PathBuf,
}

impl PersistentStore {
    /// 使用默认文件名打开数据目录
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_files(data_dir, DEFAULT_HISTORY_FILE, DEFAULT_TODO_FILE)
    }

    /// 打开数据目录并绑定两个集合的文件名，目录不存在时立即创建
    pub fn with_files(
        data_dir: impl AsRef<Path>,
        history_file: &str,
        todo_file: &str,
    ) -> Result<Self> {
        let data_dir = expand_tilde(data_dir.as_ref());
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| MemoryError::IoError(format!("创建数据目录失败: {e}")))?;
        let store = Self {
            history_path: data_dir.join(history_file),
            todo_path: data_dir.join(todo_file),
            data_dir,
        };
        info!(dir = %store.data_dir.display(), "🗄️ PersistentStore 初始化");
        Ok(store)
    }

    pub fn path(&self, collection: Collection) -> &Path {
        match collection {
            Collection::ConversationHistory => &self.history_path,
            Collection::TodoItems => &self.todo_path,
        }
    }

    /// 读取整个集合；任何读取或解析问题都退化为空集合
    pub fn load<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        let path = self.path(collection);
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(collection = %collection, path = %path.display(), "快照不存在，视为首次运行");
                return Vec::new();
            }
            Err(e) => {
                warn!(collection = %collection, path = %path.display(), "读取快照失败，从空集合开始: {e}");
                return Vec::new();
            }
        };
        if raw.trim().is_empty() {
            warn!(collection = %collection, path = %path.display(), "快照为空文件，从空集合开始");
            return Vec::new();
        }
        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(records) => {
                debug!(collection = %collection, records = records.len(), "📂 快照已加载");
                records
            }
            Err(e) => {
                warn!(collection = %collection, path = %path.display(), "快照解析失败，从空集合开始: {e}");
                Vec::new()
            }
        }
    }

    /// 整体覆盖写入集合，错误直接返回
    pub fn try_save<T: Serialize>(&self, collection: Collection, records: &[T]) -> Result<()> {
        let path = self.path(collection);
        let json = to_json_pretty(records)?;
        std::fs::write(path, json)
            .map_err(|e| MemoryError::IoError(format!("写入 {} 失败: {e}", path.display())))?;
        debug!(collection = %collection, records = records.len(), "💾 快照已持久化");
        Ok(())
    }

    /// 整体覆盖写入集合；失败只记录错误，返回是否写入成功
    pub fn save<T: Serialize>(&self, collection: Collection, records: &[T]) -> bool {
        match self.try_save(collection, records) {
            Ok(()) => true,
            Err(e) => {
                error!(collection = %collection, "保存快照失败: {e}");
                false
            }
        }
    }
}

/// 四空格缩进，与历史数据文件的格式保持一致
fn to_json_pretty<T: Serialize>(records: &[T]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records
        .serialize(&mut serializer)
        .map_err(|e| MemoryError::SerializationError(e.to_string()))?;
    Ok(buf)
}

fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/")
        && let Some(home) = std::env::var("HOME")
            .ok()
            .or_else(|| std::env::var("USERPROFILE").ok())
    {
        return PathBuf::from(home).join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::conversation::StoredTurn;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn store() -> (TempDir, PersistentStore) {
        let dir = TempDir::new().unwrap();
        let store = PersistentStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_creates_data_dir_eagerly() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("data");
        let store = PersistentStore::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.path(Collection::TodoItems), nested.join(DEFAULT_TODO_FILE));
        assert_ne!(
            store.path(Collection::TodoItems),
            store.path(Collection::ConversationHistory)
        );
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (_dir, store) = store();
        let items: Vec<String> = store.load(Collection::TodoItems);
        assert!(items.is_empty());
    }

    #[test]
    fn test_empty_and_corrupt_files_load_empty() {
        let (_dir, store) = store();
        let path = store.path(Collection::TodoItems).to_path_buf();

        std::fs::write(&path, "").unwrap();
        assert!(store.load::<String>(Collection::TodoItems).is_empty());

        std::fs::write(&path, "[\"buy milk\", \"walk").unwrap();
        assert!(store.load::<String>(Collection::TodoItems).is_empty());
        // 再读一次结果一致
        assert!(store.load::<String>(Collection::TodoItems).is_empty());

        std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();
        assert!(store.load::<String>(Collection::TodoItems).is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (_dir, store) = store();
        let history = vec![
            StoredTurn::new("user", "Hi, my name is Alex"),
            StoredTurn::new("assistant", "Hello Alex!"),
            StoredTurn::new("system", "kept at the store level"),
        ];
        assert!(store.save(Collection::ConversationHistory, &history));
        let loaded: Vec<StoredTurn> = store.load(Collection::ConversationHistory);
        assert_eq!(loaded, history);

        assert!(store.save(Collection::ConversationHistory, &loaded));
        let reloaded: Vec<StoredTurn> = store.load(Collection::ConversationHistory);
        assert_eq!(reloaded, history);
    }

    #[test]
    fn test_save_overwrites_instead_of_appending() {
        let (_dir, store) = store();
        assert!(store.save(Collection::TodoItems, &["a".to_string(), "b".to_string()]));
        assert!(store.save(Collection::TodoItems, &["c".to_string()]));
        let items: Vec<String> = store.load(Collection::TodoItems);
        assert_eq!(items, vec!["c".to_string()]);
    }

    #[test]
    fn test_file_format_is_plain_json_array() {
        let (_dir, store) = store();
        assert!(store.save(Collection::TodoItems, &["buy milk".to_string()]));
        let raw = std::fs::read_to_string(store.path(Collection::TodoItems)).unwrap();
        assert_eq!(raw, "[\n    \"buy milk\"\n]");
    }

    /// 把日志收集到内存里
    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogCapture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn load_with_logs(store: &PersistentStore, collection: Collection) -> (Vec<String>, String) {
        let capture = LogCapture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let records = tracing::subscriber::with_default(subscriber, || store.load(collection));
        (records, capture.text())
    }

    #[test]
    fn test_empty_file_warns() {
        let (_dir, store) = store();
        std::fs::write(store.path(Collection::TodoItems), "  \n").unwrap();

        let (records, logs) = load_with_logs(&store, Collection::TodoItems);
        assert!(records.is_empty());
        assert!(logs.contains("WARN"), "logs: {logs}");
        assert!(logs.contains("todo-items"), "logs: {logs}");
    }

    #[test]
    fn test_missing_file_does_not_warn() {
        let (_dir, store) = store();
        let (records, logs) = load_with_logs(&store, Collection::TodoItems);
        assert!(records.is_empty());
        assert!(logs.is_empty(), "logs: {logs}");
    }

    #[test]
    fn test_failed_save_reports_false() {
        let (dir, store) = store();
        // 目标路径被目录占用，写入必然失败
        std::fs::create_dir(dir.path().join(DEFAULT_TODO_FILE)).unwrap();
        assert!(!store.save(Collection::TodoItems, &["x".to_string()]));
        assert!(store.try_save(Collection::TodoItems, &["x".to_string()]).is_err());
    }
}
