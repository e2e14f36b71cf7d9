use clap::{Parser, Subcommand};
use reqwest::Client;
use snello::config::AppConfig;
use snello::frontend;
use snello::llm::HttpLlmClient;
use snello::llm::config::ModelRegistry;
use snello::session::{ChatSession, CheckpointPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snello", version, about = "A personal chatbot that manages your to-do list")]
struct Cli {
    /// YAML 配置文件
    #[arg(long, env = "SNELLO_CONFIG")]
    config: Option<PathBuf>,

    /// 数据目录，覆盖配置文件
    #[arg(long, env = "SNELLO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// 使用的模型名，覆盖配置文件
    #[arg(long, env = "SNELLO_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// 在终端里聊天（默认）
    Chat,
    /// 启动浏览器聊天页
    Web {
        /// 监听地址，覆盖配置文件
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    let command = args.command.unwrap_or(Command::Chat);

    // 日志写到 stderr，不和对话输出混在一起
    let default_level = match command {
        Command::Chat => "snello=warn",
        Command::Web { .. } => "snello=info",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load_or_default(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(model) = args.model {
        config.model = model;
    }

    let registry = ModelRegistry::from_env()?;
    let model = registry.get(&config.model)?;
    info!(model = %model.model, data_dir = %config.data_dir.display(), "🚀 Snello 启动");
    let llm = Arc::new(
        HttpLlmClient::new(Arc::new(Client::new()), model).temperature(config.temperature),
    );

    match command {
        Command::Chat => {
            let session = ChatSession::open(&config, llm, CheckpointPolicy::OnExit)?;
            frontend::cli::run(session).await?;
        }
        Command::Web { bind } => {
            let bind = bind.unwrap_or_else(|| config.web.bind.clone());
            let session = ChatSession::open(&config, llm, CheckpointPolicy::EveryTurn)?;
            frontend::web::serve(session, &bind).await?;
        }
    }

    Ok(())
}
