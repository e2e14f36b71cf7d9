//! LLM 配置加载
//!
//! 从环境变量读取模型配置，格式：
//! ```text
//! SNELLO_MODEL_<ID>_MODEL=gpt-4o
//! SNELLO_MODEL_<ID>_BASEURL=https://api.openai.com/v1/chat/completions
//! SNELLO_MODEL_<ID>_APIKEY=sk-...
//! ```
//! `<ID>` 为自定义标识（如 `GPT4O`、`QWEN`），不区分大小写。
//!
//! 另外只要设置了 `GOOGLE_API_KEY`，就会自动注册 `gemini-2.0-flash`，
//! 走 Gemini 的 OpenAI 兼容接口。

use crate::error::{ConfigError, Result};
use dotenv::dotenv;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;

const PREFIX: &str = "SNELLO_MODEL_";
const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const GEMINI_BASEURL: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";

/// 单个模型的连接配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelConfig {
    /// LLM 接口中使用的模型名（如 `gpt-4o`）
    pub model: String,
    /// Chat Completions 接口完整 URL
    pub baseurl: String,
    pub apikey: String,
}

/// 所有已加载的模型配置表（key = model 字段值）
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ModelRegistry {
    pub models: HashMap<String, ModelConfig>,
}

impl ModelRegistry {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// 从任意 `(key, value)` 序列构建，便于测试时不碰进程环境
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        let mut model_configs: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut google_key = None;

        for (key, value) in vars {
            if key == GOOGLE_API_KEY {
                google_key = Some(value);
                continue;
            }
            let Some(suffix) = key.strip_prefix(PREFIX) else {
                continue;
            };
            let parts: Vec<&str> = suffix.split('_').collect();
            if parts.len() != 2 {
                return Err(ConfigError::EnvFormat(key).into());
            }
            let model_id = parts[0].to_lowercase();
            let config_key = parts[1].to_lowercase();

            match config_key.as_str() {
                "model" | "baseurl" | "apikey" => {}
                _ => {
                    return Err(ConfigError::UnknownKey {
                        key: config_key,
                        var: key,
                    }
                    .into());
                }
            }
            model_configs
                .entry(model_id)
                .or_default()
                .insert(config_key, value);
        }

        let mut models = HashMap::new();
        if let Some(apikey) = google_key.filter(|k| !k.trim().is_empty()) {
            models.insert(
                GEMINI_MODEL.to_string(),
                ModelConfig {
                    model: GEMINI_MODEL.to_string(),
                    baseurl: GEMINI_BASEURL.to_string(),
                    apikey,
                },
            );
        }

        for (model_id, mut config_map) in model_configs {
            let mut take = |field: &str| {
                config_map
                    .remove(field)
                    .ok_or_else(|| ConfigError::MissingField {
                        model: model_id.clone(),
                        field: field.to_string(),
                    })
            };
            let model = take("model")?;
            let baseurl = take("baseurl")?;
            let apikey = take("apikey")?;

            // 显式配置优先于 GOOGLE_API_KEY 的默认项
            models.insert(
                model.clone(),
                ModelConfig {
                    model,
                    baseurl,
                    apikey,
                },
            );
        }

        Ok(Self { models })
    }

    pub fn get(&self, model: &str) -> Result<ModelConfig> {
        self.models
            .get(model)
            .cloned()
            .ok_or_else(|| ConfigError::ModelNotFound(model.to_string()).into())
    }
}
