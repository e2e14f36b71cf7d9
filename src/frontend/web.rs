//! 网页前端
//!
//! 一个极简的聊天页加三个 JSON 接口。会话放在一把异步锁后面，
//! 同一时刻只处理一轮对话；每轮成功后都会写检查点。

use crate::error::Result;
use crate::session::ChatSession;
use axum::{
    Json, Router,
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

const INDEX_HTML: &str = include_str!("index.html");

/// 页面上展示的一条消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMessage {
    pub role: String,
    pub content: String,
}

impl DisplayMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<DisplayMessage>,
}

struct WebInner {
    session: ChatSession,
    display: Vec<DisplayMessage>,
}

impl WebInner {
    fn history(&self) -> HistoryResponse {
        HistoryResponse {
            messages: self.display.clone(),
        }
    }
}

/// 网页端的开场白，只在页面上展示，不写入对话记录
pub fn web_greeting(session: &ChatSession) -> String {
    match session.user_name() {
        Some(name) => format!("Hello {name}! How can I help you today?"),
        None => format!(
            "Welcome to the {} Chatbot! How can I help you today?",
            session.assistant_name()
        ),
    }
}

/// 路由共享状态
#[derive(Clone)]
pub struct WebState {
    inner: Arc<Mutex<WebInner>>,
}

impl WebState {
    /// 有历史时展示历史，否则展示开场白
    pub fn new(session: ChatSession) -> Self {
        let mut display: Vec<DisplayMessage> = session
            .transcript()
            .iter()
            .map(|turn| DisplayMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            })
            .collect();
        if display.is_empty() {
            display.push(DisplayMessage::assistant(web_greeting(&session)));
        }
        Self {
            inner: Arc::new(Mutex::new(WebInner { session, display })),
        }
    }

    /// 写检查点，返回是否成功
    pub async fn checkpoint(&self) -> bool {
        self.inner.lock().await.session.checkpoint()
    }
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/history", get(history))
        .route("/api/chat", post(chat))
        .route("/api/clear", post(clear))
        .with_state(state)
}

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn history(State(state): State<WebState>) -> Json<HistoryResponse> {
    let inner = state.inner.lock().await;
    Json(inner.history())
}

async fn chat(
    State(state): State<WebState>,
    Json(req): Json<ChatRequest>,
) -> Json<HistoryResponse> {
    let mut inner = state.inner.lock().await;
    // 原样发送和记录，trim 只用来判断空消息
    let input = req.message.as_str();
    if input.trim().is_empty() {
        return Json(inner.history());
    }

    if let Some(name) = inner.session.acknowledge_name(input) {
        info!(name = %name, "👋 网页端用户自报称呼");
    }

    let reply = match inner.session.send(input).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("本轮对话失败: {e}");
            format!("Oops! An error occurred: {e}. Please try again.")
        }
    };
    inner.display.push(DisplayMessage::user(input));
    inner.display.push(DisplayMessage::assistant(reply));

    Json(inner.history())
}

async fn clear(State(state): State<WebState>) -> Json<HistoryResponse> {
    let mut inner = state.inner.lock().await;
    if !inner.session.clear() {
        warn!("清空对话记录时写盘失败");
    }
    inner.display.clear();
    info!("🧹 对话记录已清空");
    Json(inner.history())
}

/// 启动网页服务，Ctrl-C 时写检查点后退出
pub async fn serve(session: ChatSession, bind_addr: &str) -> Result<()> {
    let state = WebState::new(session);
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %bind_addr, "🌐 聊天页面已就绪: http://{bind_addr}/");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("无法监听 Ctrl-C: {e}");
            }
            info!("正在关闭网页服务");
        })
        .await?;

    if !state.checkpoint().await {
        warn!("退出时未能完整保存数据");
    }
    Ok(())
}
