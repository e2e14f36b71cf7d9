//! 待办工具：add / list / remove
//!
//! | 工具 | 对应操作 |
//! |------|----------|
//! | `add_todo_tool` | [`TodoService::add`] |
//! | `list_todos_tool` | [`TodoService::list`] |
//! | `remove_todo_tool` | [`TodoService::remove`] |
//!
//! "没找到" 之类的结果都作为正常输出返回给模型，不算工具失败。

use crate::error::Result;
use crate::todo::{self, SharedTodos};
use crate::tools::{Tool, ToolParameters, ToolResult, required_str};
use serde_json::{Value, json};
use tracing::debug;

fn task_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "task": {
                "type": "string",
                "description": description
            }
        },
        "required": ["task"]
    })
}

// ── AddTodoTool ──────────────────────────────────────────────────────────────

pub struct AddTodoTool {
    todos: SharedTodos,
}

impl AddTodoTool {
    pub fn new(todos: SharedTodos) -> Self {
        Self { todos }
    }
}

#[async_trait::async_trait]
impl Tool for AddTodoTool {
    fn name(&self) -> &str {
        "add_todo_tool"
    }

    fn description(&self) -> &str {
        "Adds a task to the user's to-do list."
    }

    fn parameters(&self) -> Value {
        task_schema("The description of the task to add.")
    }

    async fn execute(&self, parameters: ToolParameters) -> Result<ToolResult> {
        let task = required_str(&parameters, "task")?;
        if task.is_empty() {
            return Ok(ToolResult::error("task must not be empty".to_string()));
        }
        debug!(task = %task, "➕ add_todo_tool");
        let reply = todo::lock(&self.todos).add(task);
        Ok(ToolResult::success(reply))
    }
}

// ── ListTodosTool ────────────────────────────────────────────────────────────

pub struct ListTodosTool {
    todos: SharedTodos,
}

impl ListTodosTool {
    pub fn new(todos: SharedTodos) -> Self {
        Self { todos }
    }
}

#[async_trait::async_trait]
impl Tool for ListTodosTool {
    fn name(&self) -> &str {
        "list_todos_tool"
    }

    fn description(&self) -> &str {
        "Retrieves and displays the user's current to-do list."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _parameters: ToolParameters) -> Result<ToolResult> {
        let todos = todo::lock(&self.todos);
        let output = if todos.is_empty() {
            todos.list()
        } else {
            format!("Here's your current to-do list:\n{}", todos.list())
        };
        Ok(ToolResult::success(output))
    }
}

// ── RemoveTodoTool ───────────────────────────────────────────────────────────

pub struct RemoveTodoTool {
    todos: SharedTodos,
}

impl RemoveTodoTool {
    pub fn new(todos: SharedTodos) -> Self {
        Self { todos }
    }
}

#[async_trait::async_trait]
impl Tool for RemoveTodoTool {
    fn name(&self) -> &str {
        "remove_todo_tool"
    }

    fn description(&self) -> &str {
        "Removes a specified task from the to-do list. The task must match exactly."
    }

    fn parameters(&self) -> Value {
        task_schema("The description of the task to remove.")
    }

    async fn execute(&self, parameters: ToolParameters) -> Result<ToolResult> {
        let task = required_str(&parameters, "task")?;
        debug!(task = %task, "➖ remove_todo_tool");
        let reply = todo::lock(&self.todos).remove(task);
        Ok(ToolResult::success(reply))
    }
}

/// 三个待办工具，共享同一个服务句柄
pub fn todo_tools(todos: &SharedTodos) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(AddTodoTool::new(todos.clone())),
        Box::new(ListTodosTool::new(todos.clone())),
        Box::new(RemoveTodoTool::new(todos.clone())),
    ]
}
