pub mod toml_config;

use crate::core::export::DEFAULT_DOCUMENT_TITLE;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_range, Validate};
use clap::Parser;
use toml_config::TomlConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const MIN_UPLOAD_BYTES: usize = 1024;
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone, Parser)]
#[command(name = "event-checkin")]
#[command(about = "Event check-in service: import attendees, track collected items, export lists")]
pub struct CliConfig {
    /// Address to bind
    #[arg(long, env = "CHECKIN_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory that keeps a copy of every generated export
    #[arg(long, env = "CHECKIN_DOWNLOADS_DIR")]
    pub downloads_dir: Option<String>,

    /// Largest accepted upload, in bytes
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

/// Fully resolved settings the server runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub downloads_dir: Option<String>,
    pub document_title: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            downloads_dir: None,
            document_title: DEFAULT_DOCUMENT_TITLE.to_string(),
        }
    }
}

impl ServerConfig {
    /// Layers defaults, then the TOML file (if any), then CLI flags and environment.
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = &cli.config {
            tracing::info!("Loading configuration from: {}", path);
            TomlConfig::from_file(path)?.apply_to(&mut config);
        }

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    fn apply_cli(&mut self, cli: &CliConfig) {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(dir) = &cli.downloads_dir {
            self.downloads_dir = Some(dir.clone());
        }
        if let Some(limit) = cli.max_upload_bytes {
            self.max_upload_bytes = limit;
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("host", &self.host)?;
        validate_non_empty_string("document_title", &self.document_title)?;
        validate_range(
            "max_upload_bytes",
            self.max_upload_bytes,
            MIN_UPLOAD_BYTES,
            MAX_UPLOAD_BYTES,
        )?;
        if let Some(dir) = &self.downloads_dir {
            validate_path("downloads_dir", dir)?;
        }
        Ok(())
    }
}
