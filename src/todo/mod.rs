//! 待办事项
//!
//! 每条待办就是一段文本，顺序即展示顺序，允许重复。
//! 每次成功修改后立即整体写回 Store。

use crate::memory::store::{Collection, PersistentStore};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

pub const EMPTY_LIST_MESSAGE: &str = "Your to-do list is currently empty.";

/// 在工具之间共享的待办服务句柄
pub type SharedTodos = Arc<Mutex<TodoService>>;

/// 锁住共享句柄；某个持有者 panic 过也继续使用里面的数据
pub fn lock(todos: &SharedTodos) -> MutexGuard<'_, TodoService> {
    todos.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct TodoService {
    store: Arc<PersistentStore>,
    items: Vec<String>,
    /// 最近一次保存失败，内存比磁盘新
    dirty: bool,
}

impl TodoService {
    pub fn open(store: Arc<PersistentStore>) -> Self {
        let items: Vec<String> = store.load(Collection::TodoItems);
        debug!(items = items.len(), "📋 待办列表已加载");
        Self {
            store,
            items,
            dirty: false,
        }
    }

    pub fn into_shared(self) -> SharedTodos {
        Arc::new(Mutex::new(self))
    }

    /// 原样追加到末尾并立即保存
    pub fn add(&mut self, task: &str) -> String {
        if task.is_empty() {
            return "Please tell me which task to add.".to_string();
        }
        self.items.push(task.to_string());
        self.persist();
        format!("Got it! I've added '{task}' to your to-do list.")
    }

    /// 从 1 开始编号，逐行列出
    pub fn list(&self) -> String {
        if self.items.is_empty() {
            return EMPTY_LIST_MESSAGE.to_string();
        }
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 删除所有忽略大小写后与 `task` 相同的条目
    pub fn remove(&mut self, task: &str) -> String {
        let needle = task.to_lowercase();
        let before = self.items.len();
        self.items.retain(|item| item.to_lowercase() != needle);
        let removed = before - self.items.len();

        if removed == 0 {
            return format!(
                "Couldn't find '{task}' in your to-do list. Please make sure the task matches exactly."
            );
        }
        debug!(removed, "🗑️ 待办已删除");
        self.persist();
        format!("Great! I've removed '{task}' from your list.")
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 上一次保存是否失败
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 把当前列表写回 Store，返回是否成功
    pub fn flush(&mut self) -> bool {
        self.persist();
        !self.dirty
    }

    fn persist(&mut self) {
        let saved = self.store.save(Collection::TodoItems, &self.items);
        if !saved {
            warn!(items = self.items.len(), "待办列表未能保存，将在下次修改或检查点时重试");
        }
        self.dirty = !saved;
    }
}
