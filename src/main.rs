use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rust_tavily_mcp::{Config, ConfigOverrides, SearchFunction, Server, WebSearchTool};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "rust-tavily-mcp", version, about = "MCP server for Tavily web search")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Tavily API key (overrides file and environment)
    #[arg(long, env = "TVLY_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Tavily API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Default search depth (basic or advanced)
    #[arg(long, global = true)]
    search_depth: Option<String>,

    /// Default maximum number of results
    #[arg(long, global = true)]
    max_results: Option<u32>,

    /// Default request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server on stdio (default)
    Serve,
    /// Execute a single function call and print the result as JSON
    Call {
        /// Function name: search, get_search_context, qna_search or extract
        function: String,
        /// Function arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.with_target(false).init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    let overrides = ConfigOverrides {
        api_key: cli.api_key.clone(),
        base_url: cli.base_url.clone(),
        search_depth: cli.search_depth.clone(),
        max_results: cli.max_results,
        timeout: cli.timeout,
    };

    let config = Config::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(&overrides);
    config.validate().context("Invalid configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("rust-tavily-mcp v{} starting", env!("CARGO_PKG_VERSION"));
            let server = Server::new(config);
            if let Err(e) = server.run().await {
                error!("Server terminated with error: {}", e);
                return Err(e.into());
            }
            Ok(())
        }
        Command::Call { function, args } => {
            let function: SearchFunction = function.parse()?;
            let arguments: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(&args).context("--args must be a JSON object")?;

            let tool = WebSearchTool::new(&config.tavily, &config.http)?;
            let result = tool.invoke(function, arguments).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}
