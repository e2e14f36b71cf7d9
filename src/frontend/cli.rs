//! 命令行前端
//!
//! 逐行读取输入，`exit` 退出。对话记录只在退出时写盘，
//! 待办修改由工具自己立即落盘。

use crate::error::{Result, SnelloError};
use crate::session::ChatSession;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

/// 单行输入的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// 需要打印给用户的若干行
    Reply(Vec<String>),
    /// 空行，什么也不做
    Skip,
    /// 用户要求退出，检查点已完成
    Exit(Vec<String>),
}

pub fn banner(session: &ChatSession) -> Vec<String> {
    let mut lines = vec![format!(
        "Welcome to the {} Chatbot! Type 'exit' to quit.",
        session.assistant_name()
    )];
    if let Some(name) = session.user_name() {
        lines.push(format!("Remembered user name from history: {name}"));
    }
    lines.push(session.greeting());
    lines
}

/// 处理一行输入；trim 只用于判断空行和 `exit`，发送的是原文
pub async fn handle_line(session: &mut ChatSession, line: &str) -> LineOutcome {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineOutcome::Skip;
    }
    if trimmed.eq_ignore_ascii_case("exit") {
        return LineOutcome::Exit(shutdown(session));
    }

    let mut lines = Vec::new();
    if let Some(name) = session.acknowledge_name(line) {
        lines.push(format!("Acknowledged your name: {name}"));
    }

    match session.send(line).await {
        Ok(reply) => lines.push(format!("Agent: {reply}")),
        Err(e) => {
            warn!("本轮对话失败: {e}");
            lines.push(format!("An error occurred: {e}"));
            lines.push("Please try again.".to_string());
        }
    }
    LineOutcome::Reply(lines)
}

/// 退出前的检查点
pub fn shutdown(session: &mut ChatSession) -> Vec<String> {
    if !session.checkpoint() {
        warn!("退出时未能完整保存数据");
    }
    vec!["Goodbye!".to_string()]
}

/// 交互主循环
pub async fn run(mut session: ChatSession) -> Result<()> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| SnelloError::Other(format!("无法初始化命令行编辑器: {e}")))?;

    for line in banner(&session) {
        println!("{line}");
    }

    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                if let Err(e) = rl.add_history_entry(line.as_str()) {
                    debug!("写入输入历史失败: {e}");
                }
                match handle_line(&mut session, &line).await {
                    LineOutcome::Skip => continue,
                    LineOutcome::Reply(lines) => {
                        for l in lines {
                            println!("{l}");
                        }
                    }
                    LineOutcome::Exit(lines) => {
                        for l in lines {
                            println!("{l}");
                        }
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                debug!("输入流结束");
                for l in shutdown(&mut session) {
                    println!("{l}");
                }
                break;
            }
            Err(err) => {
                // 读不到输入也要先保存
                shutdown(&mut session);
                return Err(SnelloError::Other(format!("读取输入失败: {err}")));
            }
        }
    }
    Ok(())
}
