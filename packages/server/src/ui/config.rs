//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::Parser;

/// LearnLink realtime relay server
#[derive(Debug, Clone, Parser)]
#[command(name = "learnlink-server", version, about)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "LEARNLINK_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "LEARNLINK_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Shared secret used to verify HS256 session tokens
    #[arg(long, env = "LEARNLINK_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// SQLite database path (`:memory:` for a throwaway database)
    #[arg(long, env = "LEARNLINK_DATABASE", default_value = "learnlink.db")]
    pub database: PathBuf,

    /// JSON file of users and conversations to load at startup
    #[arg(long, env = "LEARNLINK_SEED", value_name = "FILE")]
    pub seed: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "LEARNLINK_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Print a session token for this user id and exit
    #[arg(long, value_name = "USER_ID")]
    pub issue_token_for: Option<String>,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
