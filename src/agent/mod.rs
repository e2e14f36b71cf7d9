//! 对话 Assistant
//!
//! 每轮对话的流程：
//!
//! ```text
//! system prompt + 历史对话 + 本轮输入
//!        │
//!        ▼
//!   LLM ──有工具调用──▶ 执行工具，结果作为 tool 消息追加 ──┐
//!    │                                                   │
//!    │◀──────────────────────────────────────────────────┘
//!    │
//!    └──纯文本──▶ 最终回复，写入对话记忆（user + assistant 各一条）
//! ```
//!
//! 工具调用过程只存在于本轮的临时消息里，不进入对话记忆。

use crate::error::{AgentError, Result};
use crate::llm::LlmClient;
use crate::llm::types::{Message, ToolCall};
use crate::memory::conversation::{ConversationMemory, Turn};
use crate::tools::{Tool, ToolManager, ToolParameters};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AssistantConfig {
    pub(crate) name: String,
    pub(crate) system_prompt: String,
    /// 单轮对话最多调用模型的次数，防止工具调用死循环
    pub(crate) max_iterations: usize,
}

impl AssistantConfig {
    pub fn new(name: &str, system_prompt: &str) -> Self {
        Self {
            name: name.to_string(),
            system_prompt: system_prompt.to_string(),
            max_iterations: 10,
        }
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }
}

pub struct Assistant {
    config: AssistantConfig,
    llm: Arc<dyn LlmClient>,
    tool_manager: ToolManager,
}

impl Assistant {
    pub fn new(config: AssistantConfig, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            config,
            llm,
            tool_manager: ToolManager::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn add_tools(&mut self, tools: Vec<Box<dyn Tool>>) {
        self.tool_manager.register_tools(tools)
    }

    pub fn list_tools(&self) -> Vec<&str> {
        self.tool_manager.list_tools()
    }

    /// 处理一条用户输入，成功时把本轮对话追加到 `memory`
    ///
    /// 失败时 `memory` 保持不变。
    pub async fn respond(&self, memory: &mut ConversationMemory, input: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(memory.len() + 2);
        messages.push(Message::system(self.config.system_prompt.clone()));
        messages.extend(memory.to_messages());
        messages.push(Message::user(input.to_string()));

        let tools = self.tool_manager.get_tool_definitions();
        let tools = (!tools.is_empty()).then_some(tools);

        for iteration in 0..self.config.max_iterations {
            debug!(agent = %self.config.name, iteration = iteration + 1, "🧠 调用模型");
            let reply = self.llm.chat(messages.clone(), tools.clone()).await?;

            if let Some(calls) = reply.tool_calls.clone().filter(|c| !c.is_empty()) {
                messages.push(Message::assistant_with_tools(calls.clone()));
                for call in calls {
                    let output = self.dispatch(&call).await;
                    messages.push(Message::tool_result(call.id, call.function.name, output));
                }
                continue;
            }

            let answer = reply.content.unwrap_or_default();
            if answer.trim().is_empty() {
                return Err(AgentError::NoResponse.into());
            }
            info!(agent = %self.config.name, iterations = iteration + 1, "✅ 本轮对话完成");
            memory.append_turn(Turn::user(input));
            memory.append_turn(Turn::assistant(answer.clone()));
            return Ok(answer);
        }

        Err(AgentError::MaxIterationsExceeded(self.config.max_iterations).into())
    }

    /// 执行单个工具调用；任何失败都转成文本回传给模型
    async fn dispatch(&self, call: &ToolCall) -> String {
        let name = call.function.name.as_str();
        let params = match parse_arguments(&call.function.arguments) {
            Ok(params) => params,
            Err(e) => {
                warn!(tool = %name, "工具参数解析失败: {e}");
                return format!("Error: invalid arguments for '{name}': {e}");
            }
        };
        info!(tool = %name, args = %call.function.arguments, "🔧 调用工具");

        match self.tool_manager.execute_tool(name, params).await {
            Ok(result) if result.success => {
                debug!(tool = %name, output = %result.output, "📤 工具结果");
                result.output
            }
            Ok(result) => {
                let message = result.error.unwrap_or_else(|| "unknown error".to_string());
                warn!(tool = %name, "工具执行失败: {message}");
                format!("Error: {message}")
            }
            Err(e) => {
                warn!(tool = %name, "工具执行失败: {e}");
                format!("Error: {e}")
            }
        }
    }
}

/// 工具参数是 JSON 字符串；空串视为无参数
fn parse_arguments(raw: &str) -> Result<ToolParameters> {
    if raw.trim().is_empty() {
        return Ok(ToolParameters::new());
    }
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Null => Ok(ToolParameters::new()),
        other => Err(crate::error::ToolError::InvalidParameter {
            name: "arguments".to_string(),
            message: format!("expected a JSON object, got {other}"),
        }
        .into()),
    }
}
