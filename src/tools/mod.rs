//! 工具系统
//!
//! 定义 [`Tool`] trait 和 [`ToolManager`]（注册、查找、执行）。
//! 暴露给模型的待办工具位于 [`todo`]。

pub mod todo;

use crate::error::{Result, ToolError};
use crate::llm::types::ToolDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// 工具执行结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(output: String) -> Self {
        Self {
            success: true,
            output,
            error: None,
        }
    }

    pub fn error(error: String) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error),
        }
    }
}

pub type ToolParameters = HashMap<String, serde_json::Value>;

/// 工具接口，所有暴露给模型的操作均实现此 trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// 工具参数的 JSON Schema 定义
    fn parameters(&self) -> serde_json::Value;
    async fn execute(&self, parameters: ToolParameters) -> Result<ToolResult>;
}

/// 取出必填的字符串参数
pub fn required_str<'a>(parameters: &'a ToolParameters, name: &str) -> Result<&'a str> {
    match parameters.get(name) {
        None | Some(serde_json::Value::Null) => {
            Err(ToolError::MissingParameter(name.to_string()).into())
        }
        Some(value) => value.as_str().ok_or_else(|| {
            ToolError::InvalidParameter {
                name: name.to_string(),
                message: format!("expected a string, got {}", value),
            }
            .into()
        }),
    }
}

/// 按名字注册工具；BTreeMap 保证发给模型的工具列表顺序稳定
#[derive(Default)]
pub struct ToolManager {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn register_tools(&mut self, tools: Vec<Box<dyn Tool>>) {
        for tool in tools {
            self.register(tool);
        }
    }

    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|name| name.as_str()).collect()
    }

    pub fn get_tool(&self, tool_name: &str) -> Option<&dyn Tool> {
        self.tools.get(tool_name).map(|tool| &**tool)
    }

    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition::from_tool(&**tool))
            .collect()
    }

    pub async fn execute_tool(
        &self,
        tool_name: &str,
        parameters: ToolParameters,
    ) -> Result<ToolResult> {
        let tool = self
            .get_tool(tool_name)
            .ok_or_else(|| ToolError::NotFound(tool_name.to_string()))?;
        tool.execute(parameters).await
    }
}
