//! Issue a token for a username and decode it again.
//!
//! Usage: cargo run -p xavyo-jwt --example issue_token -- alice
//!
//! Reads `JWT_*` variables when `JWT_SECRET_KEY` is set, otherwise signs
//! with a throwaway HS256 secret. Set `RUST_LOG=xavyo_jwt=debug` to see the
//! pipeline logs.

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use xavyo_jwt::hooks::token_id;
use xavyo_jwt::{
    Algorithm, EncoderConfig, HookDispatcher, JwtManager, SignedEncoder, SimplePrincipal,
    TokenError,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let username = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "alice".to_string());

    if let Err(e) = run(&username) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(username: &str) -> Result<(), TokenError> {
    let config = match EncoderConfig::from_env() {
        Err(TokenError::ConfigMissing { .. }) => {
            EncoderConfig::hmac(Algorithm::HS256, "example-secret-not-for-production")
        }
        other => other?,
    };

    let dispatcher = Arc::new(HookDispatcher::new());
    dispatcher.subscribe_created("token-id", 0, token_id());

    let manager = JwtManager::new(SignedEncoder::new(&config)?, dispatcher);
    let principal = SimplePrincipal::new(username).with_roles(vec!["ROLE_USER"]);

    let token = manager.create(&principal)?;
    println!("{}", token);

    match manager.decode(&token) {
        Ok(claims) => println!("{}", serde_json::Value::Object(claims)),
        Err(e) => eprintln!("Decode failed: {}", e),
    }
    Ok(())
}
