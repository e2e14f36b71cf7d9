use std::fmt;

/// Snello 的统一错误类型
#[derive(Debug)]
pub enum SnelloError {
    /// LLM 相关错误
    Llm(LlmError),
    /// 工具执行错误
    Tool(ToolError),
    /// Agent 执行错误
    Agent(AgentError),
    /// 配置错误
    Config(ConfigError),
    /// 持久化错误
    Memory(MemoryError),
    /// JSON 解析错误
    Parse(String),
    /// IO 错误
    Io(std::io::Error),
    /// 其他错误
    Other(String),
}

/// LLM 相关错误
#[derive(Debug)]
pub enum LlmError {
    /// 网络请求失败
    NetworkError(String),
    /// API 返回错误状态码
    ApiError { status: u16, message: String },
    /// 响应格式无效
    InvalidResponse(String),
    /// 没有返回内容
    EmptyResponse,
}

/// 工具执行错误
#[derive(Debug)]
pub enum ToolError {
    /// 工具未找到
    NotFound(String),
    /// 参数缺失
    MissingParameter(String),
    /// 参数类型错误
    InvalidParameter { name: String, message: String },
}

/// Agent 执行错误
#[derive(Debug)]
pub enum AgentError {
    /// 超过最大迭代次数
    MaxIterationsExceeded(usize),
    /// 模型既没有调用工具也没有给出文本
    NoResponse,
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),
    /// 配置解析失败
    ParseFailed(String),
    /// 环境变量格式不是 `SNELLO_MODEL_<ID>_<KEY>`
    EnvFormat(String),
    /// 环境变量中出现未知的配置项
    UnknownKey { key: String, var: String },
    /// 某个模型缺少必需字段
    MissingField { model: String, field: String },
    /// 请求的模型没有配置
    ModelNotFound(String),
}

/// 持久化错误
#[derive(Debug)]
pub enum MemoryError {
    /// 文件读写失败
    IoError(String),
    /// 序列化失败
    SerializationError(String),
}

impl fmt::Display for SnelloError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnelloError::Llm(e) => write!(f, "LLM Error: {}", e),
            SnelloError::Tool(e) => write!(f, "Tool Error: {}", e),
            SnelloError::Agent(e) => write!(f, "Agent Error: {}", e),
            SnelloError::Config(e) => write!(f, "Config Error: {}", e),
            SnelloError::Memory(e) => write!(f, "Memory Error: {}", e),
            SnelloError::Parse(msg) => write!(f, "JSON parse error: {}", msg),
            SnelloError::Io(e) => write!(f, "IO Error: {}", e),
            SnelloError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            LlmError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            LlmError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            LlmError::EmptyResponse => write!(f, "Empty response from LLM"),
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::NotFound(name) => write!(f, "Tool '{}' not found", name),
            ToolError::MissingParameter(name) => write!(f, "Missing parameter: {}", name),
            ToolError::InvalidParameter { name, message } => {
                write!(f, "Invalid parameter '{}': {}", name, message)
            }
        }
    }
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::MaxIterationsExceeded(n) => {
                write!(f, "Max iterations exceeded: {}", n)
            }
            AgentError::NoResponse => write!(f, "No response from LLM"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseFailed(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::EnvFormat(var) => {
                write!(f, "Malformed model variable '{}', expected SNELLO_MODEL_<ID>_<KEY>", var)
            }
            ConfigError::UnknownKey { key, var } => {
                write!(f, "Unknown model config key '{}' in '{}'", key, var)
            }
            ConfigError::MissingField { model, field } => {
                write!(f, "Model '{}' is missing '{}'", model, field)
            }
            ConfigError::ModelNotFound(model) => write!(
                f,
                "Model '{}' is not configured (set GOOGLE_API_KEY or SNELLO_MODEL_<ID>_* variables)",
                model
            ),
        }
    }
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::IoError(msg) => write!(f, "IO error: {}", msg),
            MemoryError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for SnelloError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnelloError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for LlmError {}
impl std::error::Error for ToolError {}
impl std::error::Error for AgentError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for MemoryError {}

// From 转换实现
impl From<std::io::Error> for SnelloError {
    fn from(err: std::io::Error) -> Self {
        SnelloError::Io(err)
    }
}

impl From<reqwest::Error> for SnelloError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SnelloError::Llm(LlmError::NetworkError("Request timeout".to_string()))
        } else if err.is_connect() {
            SnelloError::Llm(LlmError::NetworkError(format!(
                "Connection failed: {}",
                err
            )))
        } else {
            SnelloError::Llm(LlmError::NetworkError(err.to_string()))
        }
    }
}

impl From<serde_json::Error> for SnelloError {
    fn from(err: serde_json::Error) -> Self {
        SnelloError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for SnelloError {
    fn from(err: serde_yaml::Error) -> Self {
        SnelloError::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

impl From<LlmError> for SnelloError {
    fn from(err: LlmError) -> Self {
        SnelloError::Llm(err)
    }
}

impl From<ToolError> for SnelloError {
    fn from(err: ToolError) -> Self {
        SnelloError::Tool(err)
    }
}

impl From<AgentError> for SnelloError {
    fn from(err: AgentError) -> Self {
        SnelloError::Agent(err)
    }
}

impl From<ConfigError> for SnelloError {
    fn from(err: ConfigError) -> Self {
        SnelloError::Config(err)
    }
}

impl From<MemoryError> for SnelloError {
    fn from(err: MemoryError) -> Self {
        SnelloError::Memory(err)
    }
}

// 便捷的 Result 类型别名
pub type Result<T> = std::result::Result<T, SnelloError>;
