//! `/chat/completions` 的 HTTP 调用

use crate::error::{LlmError, Result, SnelloError};
use crate::llm::config::ModelConfig;
use crate::llm::types::{ChatCompletionRequest, ChatCompletionResponse};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

pub fn assemble_req_header(model: &ModelConfig) -> Result<HeaderMap> {
    let mut header_map = HeaderMap::new();
    let bearer = HeaderValue::from_str(&format!("Bearer {}", model.apikey))
        .map_err(|e| SnelloError::Other(format!("Invalid Authorization header: {}", e)))?;
    header_map.insert(AUTHORIZATION, bearer);
    header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(header_map)
}

/// 发送一次 completion 请求
pub async fn send_completion(
    client: &Client,
    model: &ModelConfig,
    request_body: &ChatCompletionRequest,
) -> Result<ChatCompletionResponse> {
    debug!(
        model = %model.model,
        messages = request_body.messages.len(),
        tools = request_body.tools.as_ref().map_or(0, Vec::len),
        "📡 请求 completion"
    );
    let response = client
        .post(&model.baseurl)
        .headers(assemble_req_header(model)?)
        .json(request_body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = api_error_message(&body);
        warn!(status = status.as_u16(), "模型接口返回错误: {message}");
        return Err(LlmError::ApiError {
            status: status.as_u16(),
            message,
        }
        .into());
    }

    let completion = response
        .json::<ChatCompletionResponse>()
        .await
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
    debug!(id = %completion.id, choices = completion.choices.len(), "收到 completion 响应");
    Ok(completion)
}

/// 从错误响应体里取出可读的消息
///
/// OpenAI 返回 `{"error": {"message": ...}}`，Gemini 的兼容接口有时包一层数组。
fn api_error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| match v {
        Value::Array(items) => items.first().and_then(|item| item.get("error")),
        other => other.get("error"),
    });
    let message = error.and_then(|e| e.get("message").and_then(Value::as_str).or_else(|| e.as_str()));

    match message {
        Some(m) => m.to_string(),
        None if body.trim().is_empty() => "Unknown error".to_string(),
        None => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(apikey: &str) -> ModelConfig {
        ModelConfig {
            model: "m".to_string(),
            baseurl: "http://localhost".to_string(),
            apikey: apikey.to_string(),
        }
    }

    #[test]
    fn test_header_carries_bearer_key() {
        let headers = assemble_req_header(&model("secret")).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer secret");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_header_rejects_newline_in_key() {
        assert!(assemble_req_header(&model("bad\nkey")).is_err());
    }

    #[test]
    fn test_api_error_message_shapes() {
        assert_eq!(
            api_error_message(r#"{"error": {"message": "invalid api key", "code": 401}}"#),
            "invalid api key"
        );
        assert_eq!(
            api_error_message(r#"[{"error": {"code": 429, "message": "quota exceeded"}}]"#),
            "quota exceeded"
        );
        assert_eq!(api_error_message(r#"{"error": "plain"}"#), "plain");
        assert_eq!(api_error_message("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(api_error_message(""), "Unknown error");
    }
}
