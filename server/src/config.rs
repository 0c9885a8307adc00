use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Command-line flags. Only flags given explicitly (or via their env var)
/// are serialized, so unset flags never mask the TOML file.
#[derive(Parser, Serialize, Clone, Debug)]
#[command(name = "eventboard-server", version, about = "Event board server")]
pub struct CliArgs {
    /// Port to listen on [default: 8000]
    #[arg(long, env = "EVENTBOARD_PORT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Bind address [default: 127.0.0.1]
    #[arg(long, env = "EVENTBOARD_BIND_ADDRESS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,

    /// Path to TOML config file
    #[arg(long, default_value = "./eventboard.toml")]
    #[serde(skip)]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "EVENTBOARD_JSON_LOGS")]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub generate_config: bool,

    /// Data directory for the SQLite database [default: ./data]
    #[arg(long, env = "EVENTBOARD_DATA_DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,

    /// Create an "admin" user on first boot when the users table is empty [default: true]
    #[arg(long, env = "EVENTBOARD_SEED_ADMIN", action = clap::ArgAction::Set)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_admin: Option<bool>,
}

/// Effective server configuration after all layers are merged.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default)]
    pub generate_config: bool,
    pub data_dir: String,
    pub seed_admin: bool,

    /// Live update fan-out settings ([broadcast] section in TOML)
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

/// Settings for the WebSocket fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Outbound messages queued per connection before it is considered dead (default: 64)
    #[serde(default = "default_connection_buffer")]
    pub connection_buffer: usize,

    /// Upper bound in seconds on a single socket write (default: 10)
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            connection_buffer: default_connection_buffer(),
            send_timeout_secs: default_send_timeout(),
        }
    }
}

fn default_connection_buffer() -> usize {
    64
}

fn default_send_timeout() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "127.0.0.1".to_string(),
            json_logs: false,
            generate_config: false,
            data_dir: "./data".to_string(),
            seed_admin: true,
            broadcast: BroadcastConfig::default(),
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (EVENTBOARD_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment(CliArgs::parse()).extract()
    }

    fn figment(cli: CliArgs) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&cli.config))
            .merge(Env::prefixed("EVENTBOARD_").split("__"))
            .merge(Serialized::defaults(cli))
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Event Board Server Configuration
# Place this file at ./eventboard.toml or specify with --config <path>
# All settings can be overridden via environment variables (EVENTBOARD_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 8000)
# port = 8000

# Bind address (default: 127.0.0.1)
# bind_address = "127.0.0.1"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Data directory for the SQLite database
# data_dir = "./data"

# Create an "admin" user on first boot if no users exist
# seed_admin = true

# ---- Live updates ----
# [broadcast]

# Messages queued per WebSocket connection; a client that falls this far
# behind is disconnected (default: 64)
# connection_buffer = 64

# Maximum seconds a single socket write may take (default: 10)
# send_timeout_secs = 10
"#
    .to_string()
}
