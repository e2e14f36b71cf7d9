//! 应用配置
//!
//! 可选的 YAML 配置文件，所有字段都有默认值，文件中只需写要覆盖的项：
//!
//! ```yaml
//! data_dir: data
//! model: gemini-2.0-flash
//! temperature: 0.7
//! web:
//!   bind: 127.0.0.1:7860
//! ```

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant named Snello. \
You remember the user's name and previous conversations. \
You can help manage a personal to-do list using the provided tools. \
If the user mentions their name, try to remember it for future interactions. \
Always be polite and concise.";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    /// 持久化数据目录，启动时自动创建
    pub data_dir: PathBuf,
    pub history_file: String,
    pub todo_file: String,
    /// 模型名，对应 [`crate::llm::config::ModelRegistry`] 中的 key
    pub model: String,
    pub temperature: f32,
    /// 单轮对话内最多调用模型的次数
    pub max_iterations: usize,
    pub assistant_name: String,
    pub system_prompt: String,
    pub web: WebConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            history_file: "conversation_history.json".to_string(),
            todo_file: "todo_list.json".to_string(),
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.7,
            max_iterations: 10,
            assistant_name: "Snello".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            web: WebConfig::default(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7860".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        let config: AppConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// 有路径就读文件，否则全部取默认值
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model: gpt-4o-mini\nweb:\n  bind: 0.0.0.0:9000").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.web.bind, "0.0.0.0:9000");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.todo_file, "todo_list.json");
        assert_eq!(config.max_iterations, 10);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = AppConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(
            err,
            crate::error::SnelloError::Config(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = AppConfig::load_or_default(None).unwrap();
        assert_eq!(config.assistant_name, "Snello");
        assert_eq!(config.history_file, "conversation_history.json");
    }
}
