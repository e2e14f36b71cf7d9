#![allow(dead_code)]

use snello::agent::AssistantConfig;
use snello::memory::PersistentStore;
use snello::session::{ChatSession, CheckpointPolicy};
use snello::testing::MockLlmClient;
use std::sync::Arc;
use tempfile::TempDir;

/// 每个测试一个独立的临时数据目录
pub fn data_dir() -> TempDir {
    TempDir::new().unwrap()
}

pub fn store(dir: &TempDir) -> Arc<PersistentStore> {
    Arc::new(PersistentStore::new(dir.path()).unwrap())
}

pub fn session(dir: &TempDir, llm: MockLlmClient, policy: CheckpointPolicy) -> ChatSession {
    ChatSession::with_store(
        store(dir),
        AssistantConfig::new("Snello", "You are Snello."),
        Arc::new(llm),
        policy,
    )
}
