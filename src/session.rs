//! 一个数据目录对应的对话会话
//!
//! [`ChatSession`] 显式持有全部可变状态：对话记忆、待办服务、
//! Assistant 和推断出的用户称呼。前端只和它打交道。

use crate::agent::{Assistant, AssistantConfig};
use crate::config::AppConfig;
use crate::error::Result;
use crate::llm::LlmClient;
use crate::memory::conversation::{ConversationMemory, Turn};
use crate::memory::identity::{infer_name, infer_name_from_text};
use crate::memory::store::PersistentStore;
use crate::todo::{self, SharedTodos, TodoService};
use crate::tools::todo::todo_tools;
use std::sync::Arc;
use tracing::{info, warn};

/// 何时把内存状态写回磁盘
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointPolicy {
    /// 每轮成功对话之后（网页端）
    EveryTurn,
    /// 只在退出时（命令行）
    OnExit,
}

pub struct ChatSession {
    memory: ConversationMemory,
    todos: SharedTodos,
    assistant: Assistant,
    user_name: Option<String>,
    policy: CheckpointPolicy,
}

impl ChatSession {
    /// 按配置打开数据目录并装配 Assistant
    pub fn open(
        config: &AppConfig,
        llm: Arc<dyn LlmClient>,
        policy: CheckpointPolicy,
    ) -> Result<Self> {
        let store = Arc::new(PersistentStore::with_files(
            &config.data_dir,
            &config.history_file,
            &config.todo_file,
        )?);
        let assistant_config = AssistantConfig::new(&config.assistant_name, &config.system_prompt)
            .max_iterations(config.max_iterations);
        Ok(Self::with_store(store, assistant_config, llm, policy))
    }

    pub fn with_store(
        store: Arc<PersistentStore>,
        assistant_config: AssistantConfig,
        llm: Arc<dyn LlmClient>,
        policy: CheckpointPolicy,
    ) -> Self {
        let memory = ConversationMemory::open(store.clone());
        let todos = TodoService::open(store).into_shared();
        let mut assistant = Assistant::new(assistant_config, llm);
        assistant.add_tools(todo_tools(&todos));

        let user_name = infer_name(memory.turns());
        if let Some(name) = &user_name {
            info!(name = %name, "从历史中记起用户称呼");
        }

        Self {
            memory,
            todos,
            assistant,
            user_name,
            policy,
        }
    }

    pub fn assistant_name(&self) -> &str {
        self.assistant.name()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn transcript(&self) -> &[Turn] {
        self.memory.turns()
    }

    pub fn todos(&self) -> &SharedTodos {
        &self.todos
    }

    pub fn greeting(&self) -> String {
        match &self.user_name {
            Some(name) => format!("Hello, {name}! What can I help you with today?"),
            None => "What can I help you with today?".to_string(),
        }
    }

    /// 尚未知道称呼时，从本轮输入中识别；返回新记住的称呼
    pub fn acknowledge_name(&mut self, input: &str) -> Option<String> {
        if self.user_name.is_some() {
            return None;
        }
        let name = infer_name_from_text(input)?;
        info!(name = %name, "记住用户称呼");
        self.user_name = Some(name.clone());
        Some(name)
    }

    /// 处理一轮对话
    pub async fn send(&mut self, input: &str) -> Result<String> {
        let reply = self.assistant.respond(&mut self.memory, input).await?;
        if self.policy == CheckpointPolicy::EveryTurn {
            self.checkpoint();
        }
        Ok(reply)
    }

    /// 把待办和对话记录全部写回磁盘，返回是否都成功
    pub fn checkpoint(&mut self) -> bool {
        let todos_saved = todo::lock(&self.todos).flush();
        let history_saved = self.memory.save_to_store();
        if !(todos_saved && history_saved) {
            warn!(todos_saved, history_saved, "检查点未完全写入");
        }
        todos_saved && history_saved
    }

    /// 清空对话记录（内存与磁盘），待办不受影响
    pub fn clear(&mut self) -> bool {
        self.memory.clear()
    }
}
