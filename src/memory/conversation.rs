//! 对话记忆
//!
//! [`ConversationMemory`] 持有进程内的对话记录（[`Turn`] 序列），
//! 并负责与 Store 中的 `conversation-history` 集合互相转换。
//!
//! 除 [`ConversationMemory::clear`] 外，所有修改都只发生在内存里，
//! 需要调用方在检查点显式调用 [`ConversationMemory::save_to_store`]。

use crate::llm::types::Message;
use crate::memory::store::{Collection, PersistentStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// 对话角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// 只识别 `user` / `assistant`，其余返回 None
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一条对话记录，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn to_message(&self) -> Message {
        match self.role {
            Role::User => Message::user(self.content.clone()),
            Role::Assistant => Message::assistant(self.content.clone()),
        }
    }
}

/// 磁盘上的对话记录，role 保留原始字符串
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl StoredTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn to_turn(&self) -> Option<Turn> {
        Role::parse(&self.role).map(|role| Turn {
            role,
            content: self.content.clone(),
        })
    }
}

impl From<&Turn> for StoredTurn {
    fn from(turn: &Turn) -> Self {
        Self::new(turn.role.as_str(), turn.content.clone())
    }
}

pub struct ConversationMemory {
    store: Arc<PersistentStore>,
    /// 当前工作中的对话记录
    turns: Vec<Turn>,
    /// 最近一次与磁盘一致的记录
    snapshot: Vec<StoredTurn>,
}

impl ConversationMemory {
    /// 创建并立即从 Store 加载历史
    pub fn open(store: Arc<PersistentStore>) -> Self {
        let mut memory = Self {
            store,
            turns: Vec::new(),
            snapshot: Vec::new(),
        };
        memory.load_from_store();
        memory
    }

    /// 用 Store 中的历史替换当前记录，未知 role 的条目直接丢弃
    pub fn load_from_store(&mut self) {
        let records: Vec<StoredTurn> = self.store.load(Collection::ConversationHistory);
        let turns: Vec<Turn> = records.iter().filter_map(StoredTurn::to_turn).collect();
        let dropped = records.len() - turns.len();
        if dropped > 0 {
            debug!(dropped, "忽略未知 role 的历史记录");
        }
        info!(turns = turns.len(), "📥 已从 JSON 加载对话历史");
        self.turns = turns;
        self.snapshot = records;
    }

    pub fn append_turn(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// 把完整对话记录写回 Store（整体覆盖），返回是否写入成功
    pub fn save_to_store(&mut self) -> bool {
        let records: Vec<StoredTurn> = self.turns.iter().map(StoredTurn::from).collect();
        let saved = self.store.save(Collection::ConversationHistory, &records);
        if saved {
            debug!(turns = records.len(), "💾 对话历史已保存");
            self.snapshot = records;
        }
        saved
    }

    /// 清空内存记录并立即写入空快照
    ///
    /// 写入失败时保留旧快照，[`is_synced`](Self::is_synced) 会如实报告不一致。
    pub fn clear(&mut self) -> bool {
        self.turns.clear();
        let saved = self
            .store
            .save::<StoredTurn>(Collection::ConversationHistory, &[]);
        if saved {
            self.snapshot.clear();
        }
        info!(saved, "🧹 对话历史已清空");
        saved
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// 当前记录是否与最近一次加载/保存的快照一致
    pub fn is_synced(&self) -> bool {
        self.turns.len() == self.snapshot.len()
            && self
                .turns
                .iter()
                .zip(&self.snapshot)
                .all(|(turn, stored)| StoredTurn::from(turn) == *stored)
    }

    /// 转成发给模型的消息列表
    pub fn to_messages(&self) -> Vec<Message> {
        self.turns.iter().map(Turn::to_message).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, Arc<PersistentStore>) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(PersistentStore::new(dir.path()).unwrap());
        (dir, store)
    }

    #[test]
    fn test_open_loads_history_and_drops_unknown_roles() {
        let (_dir, store) = store();
        store.save(
            Collection::ConversationHistory,
            &[
                StoredTurn::new("user", "hi"),
                StoredTurn::new("system", "ignored"),
                StoredTurn::new("assistant", "hello"),
                StoredTurn::new("tool", "ignored too"),
            ],
        );

        let memory = ConversationMemory::open(store);
        assert_eq!(memory.turns(), &[Turn::user("hi"), Turn::assistant("hello")]);
        // 丢弃的记录让内存和磁盘不再一致
        assert!(!memory.is_synced());
    }

    #[test]
    fn test_save_is_full_replace_in_order() {
        let (_dir, store) = store();
        let mut memory = ConversationMemory::open(store.clone());
        memory.append_turn(Turn::user("first"));
        memory.append_turn(Turn::assistant("second"));
        assert!(!memory.is_synced());
        assert!(memory.save_to_store());
        assert!(memory.is_synced());

        memory.append_turn(Turn::user("third"));
        assert!(memory.save_to_store());

        let on_disk: Vec<StoredTurn> = store.load(Collection::ConversationHistory);
        assert_eq!(
            on_disk,
            vec![
                StoredTurn::new("user", "first"),
                StoredTurn::new("assistant", "second"),
                StoredTurn::new("user", "third"),
            ]
        );
    }

    #[test]
    fn test_unsaved_turns_are_not_persisted() {
        let (_dir, store) = store();
        let mut memory = ConversationMemory::open(store.clone());
        memory.append_turn(Turn::user("not saved"));

        let reopened = ConversationMemory::open(store);
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_clear_empties_memory_and_file() {
        let (_dir, store) = store();
        let mut memory = ConversationMemory::open(store.clone());
        memory.append_turn(Turn::user("hi"));
        memory.append_turn(Turn::assistant("hello"));
        memory.save_to_store();

        assert!(memory.clear());
        assert!(memory.is_empty());
        assert!(memory.is_synced());

        let raw = std::fs::read_to_string(store.path(Collection::ConversationHistory)).unwrap();
        assert_eq!(raw, "[]");
        assert!(ConversationMemory::open(store).is_empty());
    }

    #[test]
    fn test_failed_clear_keeps_divergence_visible() {
        let (dir, store) = store();
        let mut memory = ConversationMemory::open(store.clone());
        memory.append_turn(Turn::user("hi"));
        assert!(memory.save_to_store());

        // 历史文件被目录顶替，写入必然失败
        let path = store.path(Collection::ConversationHistory).to_path_buf();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(!memory.clear());
        assert!(memory.is_empty());
        assert!(!memory.is_synced());

        // 路径恢复后再次清空即可重新同步
        std::fs::remove_dir(&path).unwrap();
        assert!(memory.clear());
        assert!(memory.is_synced());
        drop(dir);
    }

    #[test]
    fn test_to_messages_maps_roles() {
        let (_dir, store) = store();
        let mut memory = ConversationMemory::open(store);
        memory.append_turn(Turn::user("q"));
        memory.append_turn(Turn::assistant("a"));

        let messages = memory.to_messages();
        assert_eq!(messages[0], Message::user("q".to_string()));
        assert_eq!(messages[1], Message::assistant("a".to_string()));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("User"), None);
    }
}
