mod env;
mod file_config;

pub use env::{
    EnvSource, MapEnv, PermissionFlags, ProcessEnv, ENV_AUTH_MODE, ENV_CONFIG_FILE,
    ENV_DATA_PARTITION, ENV_DOMAIN, ENV_ENABLE_DELETE_MODE, ENV_ENABLE_WRITE_MODE,
    ENV_SERVER_URL, ENV_TIMEOUT,
};
pub use file_config::{FileConfig, ServerFileConfig};

use anyhow::{anyhow, bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_DOMAIN: &str = "contoso.com";
pub const DEFAULT_TIMEOUT_SEC: u64 = 30;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config
/// and by the environment.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub server_url: Option<String>,
    pub data_partition: Option<String>,
    pub domain: Option<String>,
    pub timeout_sec: Option<u64>,
}

/// Static settings, resolved once at startup.
///
/// Write/delete permission flags are not stored here: they are read
/// through [`EnvSource`] at call time, see [`PermissionFlags`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_url: String,
    pub data_partition: String,
    pub domain: String,
    pub timeout: Duration,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments, an optional TOML file and the
    /// environment. Precedence, lowest first: CLI, TOML, environment.
    pub fn resolve(
        cli: &CliConfig,
        file_config: Option<FileConfig>,
        env: &dyn EnvSource,
    ) -> Result<Self> {
        let file = file_config.and_then(|f| f.server).unwrap_or_default();

        let server_url = env
            .non_empty(ENV_SERVER_URL)
            .or(file.url)
            .or_else(|| cli.server_url.clone())
            .ok_or_else(|| {
                anyhow!(
                    "OSDU server URL must be specified via {}, [server] url or --server-url",
                    ENV_SERVER_URL
                )
            })?;
        let server_url = server_url.trim_end_matches('/').to_string();
        if !(server_url.starts_with("http://") || server_url.starts_with("https://")) {
            bail!("OSDU server URL must be http(s): {}", server_url);
        }

        let data_partition = env
            .non_empty(ENV_DATA_PARTITION)
            .or(file.data_partition)
            .or_else(|| cli.data_partition.clone())
            .ok_or_else(|| {
                anyhow!(
                    "Data partition must be specified via {}, [server] data_partition or --data-partition",
                    ENV_DATA_PARTITION
                )
            })?;

        let domain = env
            .non_empty(ENV_DOMAIN)
            .or(file.domain)
            .or_else(|| cli.domain.clone())
            .unwrap_or_else(|| DEFAULT_DOMAIN.to_string());

        let timeout_sec = match env.non_empty(ENV_TIMEOUT) {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("{} must be a number of seconds", ENV_TIMEOUT))?,
            None => file
                .timeout
                .or(cli.timeout_sec)
                .unwrap_or(DEFAULT_TIMEOUT_SEC),
        };
        if timeout_sec == 0 {
            bail!("Request timeout must be greater than zero");
        }

        Ok(Self {
            server_url,
            data_partition,
            domain,
            timeout: Duration::from_secs(timeout_sec),
        })
    }
}
