//! Mock LLM 客户端，用于在不发起真实 HTTP 请求的情况下测试 [`Assistant`](crate::agent::Assistant)
//! 以及前端驱动。
//!
//! # 示例
//!
//! ```rust
//! use snello::testing::MockLlmClient;
//! use snello::llm::LlmClient;
//! use snello::llm::types::Message;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mock = MockLlmClient::new()
//!     .with_tool_call("list_todos_tool", serde_json::json!({}))
//!     .with_response("Your list is empty.");
//!
//! let first = mock.chat(vec![Message::user("hi".to_string())], None).await.unwrap();
//! assert!(first.has_tool_calls());
//! let second = mock.chat(vec![], None).await.unwrap();
//! assert_eq!(second.content.as_deref(), Some("Your list is empty."));
//! assert_eq!(mock.call_count(), 2);
//! # }
//! ```

use crate::error::{LlmError, Result, SnelloError};
use crate::llm::LlmClient;
use crate::llm::types::{Message, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// 预设响应（消息或错误）
enum MockLlmResponse {
    Reply(Message),
    Err(SnelloError),
}

struct RecordedCall {
    messages: Vec<Message>,
    tools: Option<Vec<ToolDefinition>>,
}

/// 可脚本化的 Mock LLM 客户端。
///
/// 按顺序返回预设的响应；队列耗尽后返回 `EmptyResponse` 错误。
pub struct MockLlmClient {
    responses: Arc<Mutex<VecDeque<MockLlmResponse>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn push(self, response: MockLlmResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// 追加一条纯文本回复
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(MockLlmResponse::Reply(Message::assistant(text.into())))
    }

    /// 追加一条只含单个工具调用的回复
    pub fn with_tool_call(self, name: &str, arguments: Value) -> Self {
        self.with_raw_tool_call(name, &arguments.to_string())
    }

    /// 追加工具调用，参数原样使用（可用来模拟模型给出的非法 JSON）
    pub fn with_raw_tool_call(self, name: &str, arguments: &str) -> Self {
        let id = format!("call_{}", uuid::Uuid::new_v4().simple());
        self.push(MockLlmResponse::Reply(Message::assistant_with_tools(vec![
            ToolCall::function(id, name, arguments),
        ])))
    }

    /// 追加一条错误响应
    pub fn with_error(self, err: SnelloError) -> Self {
        self.push(MockLlmResponse::Err(err))
    }

    pub fn with_network_error(self, msg: impl Into<String>) -> Self {
        self.with_error(SnelloError::Llm(LlmError::NetworkError(msg.into())))
    }

    /// 已发生的调用总次数
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// 最后一次调用时传入的 messages
    pub fn last_messages(&self) -> Option<Vec<Message>> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|c| c.messages.clone())
    }

    /// 最后一次调用时携带的工具名
    pub fn last_tool_names(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .and_then(|c| c.tools.as_ref())
            .map(|tools| tools.iter().map(|t| t.function.name.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn chat(
        &self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> Result<Message> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall { messages, tools });

        match self.responses.lock().unwrap().pop_front() {
            Some(MockLlmResponse::Reply(message)) => Ok(message),
            Some(MockLlmResponse::Err(e)) => Err(e),
            None => Err(SnelloError::Llm(LlmError::EmptyResponse)),
        }
    }
}
