mod client;
pub mod config;
pub mod types;

use crate::error::{LlmError, Result};
use crate::llm::config::ModelConfig;
use crate::llm::types::{ChatCompletionRequest, Message, ToolDefinition};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

pub use client::assemble_req_header;

/// 对话模型接口，Assistant 只依赖这个 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 发起一次对话，返回模型的回复消息（可能带工具调用）
    async fn chat(&self, messages: Vec<Message>, tools: Option<Vec<ToolDefinition>>)
    -> Result<Message>;
}

/// 基于 OpenAI 兼容 `/chat/completions` 接口的实现
pub struct HttpLlmClient {
    client: Arc<Client>,
    model: ModelConfig,
    temperature: Option<f32>,
}

impl HttpLlmClient {
    pub fn new(client: Arc<Client>, model: ModelConfig) -> Self {
        Self {
            client,
            model,
            temperature: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn chat(
        &self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> Result<Message> {
        let tools = tools.filter(|t| !t.is_empty());
        let tool_choice = tools.as_ref().map(|_| "auto".to_string());
        let request_body = ChatCompletionRequest {
            model: self.model.model.clone(),
            messages,
            tools,
            tool_choice,
            temperature: self.temperature,
            max_tokens: None,
        };

        let response = client::send_completion(&self.client, &self.model, &request_body).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| LlmError::EmptyResponse.into())
    }
}
