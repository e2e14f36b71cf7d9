//! 记忆与持久化
//!
//! | 层次 | 实现 | 作用 |
//! |------|------|------|
//! | 磁盘快照 | [`PersistentStore`] | 每个集合一个 JSON 数组文件 |
//! | 对话记忆 | [`ConversationMemory`] | 内存中的对话记录，显式检查点落盘 |
//! | 称呼推断 | [`infer_name`] | 从历史里找 "my name is"，不落盘 |
//!
//! ```rust,no_run
//! use snello::memory::{ConversationMemory, PersistentStore, Turn};
//! use std::sync::Arc;
//!
//! # fn example() -> snello::error::Result<()> {
//! let store = Arc::new(PersistentStore::new("data")?);
//! let mut memory = ConversationMemory::open(store);
//! memory.append_turn(Turn::user("Hi, my name is Alex"));
//! memory.append_turn(Turn::assistant("Nice to meet you, Alex!"));
//! memory.save_to_store();
//! # Ok(())
//! # }
//! ```

pub mod conversation;
pub mod identity;
pub mod store;

pub use conversation::{ConversationMemory, Role, StoredTurn, Turn};
pub use identity::{infer_name, infer_name_from_text};
pub use store::{Collection, PersistentStore};
