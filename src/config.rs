use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file, looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "gitcmd.toml";

/// Main configuration structure for gitcmd
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GitCmdConfig {
    /// How git commands are assembled
    pub git: GitSettings,
    /// How assembled commands are run
    pub execution: ExecutionConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GitSettings {
    /// Git binary to invoke
    pub binary: String,
    /// Repository directory; the process working directory when unset
    pub working_dir: Option<PathBuf>,
    /// Environment variables set on every git command
    #[serde(default)]
    pub env: Vec<EnvVar>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExecutionConfig {
    /// Kill git after this many seconds
    pub timeout_seconds: Option<u64>,
}

impl ExecutionConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level or `EnvFilter` directive
    pub log_level: String,
    /// Emit JSON lines instead of human readable logs
    pub json_logs: bool,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
            working_dir: None,
            env: Vec::new(),
        }
    }
}

impl Default for GitCmdConfig {
    fn default() -> Self {
        Self {
            git: GitSettings::default(),
            execution: ExecutionConfig {
                timeout_seconds: None,
            },
            observability: ObservabilityConfig {
                log_level: "warn".to_string(),
                json_logs: false,
            },
        }
    }
}

impl GitCmdConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`path`, or gitcmd.toml when present)
    /// 3. Environment variables (prefixed with GITCMD_, `__` between sections)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&Self::default()).context("Failed to serialize default config")?,
        );

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if Path::new(CONFIG_FILE_NAME).exists() {
                    builder = builder.add_source(File::with_name(CONFIG_FILE_NAME));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("GITCMD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;
        let gitcmd_config: GitCmdConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(gitcmd_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
