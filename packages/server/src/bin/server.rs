//! LearnLink realtime relay server.
//!
//! Run with:
//! ```not_rust
//! LEARNLINK_JWT_SECRET=change-me cargo run --bin learnlink-server
//! ```
//!
//! Issue a token for local testing:
//! ```not_rust
//! LEARNLINK_JWT_SECRET=change-me cargo run --bin learnlink-server -- --issue-token-for 1
//! ```

use clap::Parser;
use learnlink_server::{
    ServerConfig,
    domain::UserId,
    infrastructure::auth::JwtTokenVerifier,
};
use learnlink_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    if let Some(user_id) = config.issue_token_for.clone() {
        issue_token(&config, user_id);
        return;
    }

    // Run the server
    if let Err(e) = learnlink_server::run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn issue_token(config: &ServerConfig, user_id: String) {
    let user_id = match UserId::new(user_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Invalid user id: {}", e);
            std::process::exit(2);
        }
    };

    let verifier = JwtTokenVerifier::new(config.jwt_secret.as_bytes());
    match verifier.issue(&user_id, None, chrono::Duration::hours(24)) {
        Ok(token) => println!("{token}"),
        Err(e) => {
            tracing::error!("Failed to issue token: {}", e);
            std::process::exit(1);
        }
    }
}
