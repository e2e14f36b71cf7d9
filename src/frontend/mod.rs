//! 前端
//!
//! - [`cli`]：命令行交互，退出时写检查点
//! - [`web`]：浏览器聊天页，每轮写检查点

pub mod cli;
pub mod web;
