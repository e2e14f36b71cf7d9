//! 测试基础设施
//!
//! | 类型 | 用途 |
//! |------|------|
//! | [`MockLlmClient`] | 替代真实 LLM，按脚本返回文本回复、工具调用或错误 |
//!
//! 所有 Mock 都完全在内存中运行，不发网络请求。

mod mock_llm;

pub use mock_llm::MockLlmClient;
