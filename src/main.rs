use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use osdu_mcp_server::auth::SharedAuth;
use osdu_mcp_server::client::{HttpTransport, ReqwestTransport};
use osdu_mcp_server::config::{
    AppConfig, CliConfig, EnvSource, FileConfig, PermissionFlags, ProcessEnv, ENV_CONFIG_FILE,
};
use osdu_mcp_server::mcp::{create_registry, run_stdio, McpState, ToolContext};

#[derive(Parser, Debug)]
#[clap(version, about = "MCP server for the OSDU platform, speaking JSON-RPC over stdio")]
struct CliArgs {
    /// Path to a TOML config file. Falls back to OSDU_MCP_CONFIG.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the OSDU platform.
    #[clap(long)]
    pub server_url: Option<String>,

    /// OSDU data partition id.
    #[clap(long)]
    pub data_partition: Option<String>,

    /// Entitlements domain used in ACL group emails.
    #[clap(long)]
    pub domain: Option<String>,

    /// Timeout in seconds for OSDU HTTP requests.
    #[clap(long)]
    pub timeout_sec: Option<u64>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            server_url: self.server_url.clone(),
            data_partition: self.data_partition.clone(),
            domain: self.domain.clone(),
            timeout_sec: self.timeout_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let env: Arc<dyn EnvSource> = Arc::new(ProcessEnv);

    let config_path = cli_args
        .config
        .clone()
        .or_else(|| env.non_empty(ENV_CONFIG_FILE).map(PathBuf::from));
    let file_config = match &config_path {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };

    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config, env.as_ref())?;
    let permissions = PermissionFlags::read(env.as_ref());
    info!(
        server_url = %config.server_url,
        data_partition = %config.data_partition,
        timeout_sec = config.timeout.as_secs(),
        write_enabled = permissions.write_enabled,
        delete_enabled = permissions.delete_enabled,
        "Starting OSDU MCP server"
    );

    let transport: Arc<dyn HttpTransport> = Arc::new(
        ReqwestTransport::new(config.timeout).context("Failed to create HTTP client")?,
    );
    let auth = Arc::new(SharedAuth::lazy(env.clone()));
    let ctx = ToolContext::new(Arc::new(config), env, auth, transport);

    let state = Arc::new(McpState {
        registry: Arc::new(create_registry()),
        ctx,
    });

    run_stdio(state).await
}
