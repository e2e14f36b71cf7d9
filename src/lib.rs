pub mod agent;
pub mod config;
pub mod error;
pub mod frontend;
pub mod llm;
pub mod memory;
pub mod session;
pub mod testing;
pub mod todo;
pub mod tools;

pub mod prelude {
    pub use crate::agent::{Assistant, AssistantConfig};
    pub use crate::config::AppConfig;
    pub use crate::error::{Result, SnelloError};
    pub use crate::llm::LlmClient;
    pub use crate::memory::{ConversationMemory, PersistentStore};
    pub use crate::session::{ChatSession, CheckpointPolicy};
    pub use crate::todo::TodoService;
    pub use crate::tools::{Tool, ToolParameters, ToolResult};
}
