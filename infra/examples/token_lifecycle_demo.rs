//! Token lifecycle against a local Redis
//!
//! Requires Redis and an RS256 key pair:
//!
//! ```text
//! openssl genpkey -algorithm RSA -pkeyopt rsa_keygen_bits:2048 -out keys/jwt_private_key.pem
//! openssl pkey -in keys/jwt_private_key.pem -pubout -out keys/jwt_public_key.pem
//! cargo run -p tg_infra --example token_lifecycle_demo
//! ```

use std::sync::Arc;

use tg_core::{KeyProvider, Principal, Rs256KeyManager, TokenKind, TokenManager, TokenServiceConfig};
use tg_infra::telemetry::init_tracing;
use tg_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tg_infra::load_env();
    let config = AppConfig::from_env();
    init_tracing(&config.logging)?;

    let keys: Arc<dyn KeyProvider> = Arc::new(Rs256KeyManager::from_config(&config.jwt)?);
    let services = tg_infra::initialize(&config.cache).await?;
    let manager = TokenManager::new(
        keys,
        services.revocation_store,
        TokenServiceConfig::from(&config.jwt),
    )?;

    let principal = Principal::new("u1", "a@example.com", ["USER"]);
    let pair = manager.issue_tokens(&principal).await?;
    println!("Issued pair, access token valid for {}s", pair.access_expires_in(chrono::Utc::now()));

    let outcome = manager.validate(&pair.access_token, TokenKind::Access).await;
    println!("Access token valid: {}", outcome.is_valid());

    let rotated = manager.rotate_refresh(&pair.refresh_token).await?;
    println!("Rotated refresh token");

    match manager.rotate_refresh(&pair.refresh_token).await {
        Ok(_) => println!("Replay unexpectedly accepted"),
        Err(e) => println!("Replay rejected: {} (HTTP {})", e, e.status_code()),
    }

    manager
        .logout(Some(&rotated.access_token), Some(&rotated.refresh_token))
        .await;
    println!(
        "After logout, access token revoked: {}",
        manager.is_access_revoked(&rotated.access_token).await
    );

    Ok(())
}
