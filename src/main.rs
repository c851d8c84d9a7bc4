//! FlashDeck - Flashcard Study Backend
//! Mission: Spaced-out studying, locked-down decks

use anyhow::{Context, Result};
use dotenv::dotenv;
use flashdeck_backend::{
    api::{routes, AppState},
    auth::{AuthService, AuthState, TokenService, UserStore},
    store::DeckStore,
};
use std::path::{Path, PathBuf};
use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    info!("🚀 FlashDeck backend starting");

    // Signing secret is process-lifetime configuration, loaded once
    let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

    let auth_db_path = resolve_data_path(env::var("AUTH_DB_PATH").ok(), "flashdeck_auth.db");
    let deck_db_path = resolve_data_path(env::var("DB_PATH").ok(), "flashdeck_data.db");

    let users = Arc::new(UserStore::new(&auth_db_path).context("Failed to open user store")?);
    let decks = Arc::new(DeckStore::new(&deck_db_path).context("Failed to open deck store")?);
    let tokens = Arc::new(TokenService::new(jwt_secret));
    let service = Arc::new(AuthService::new(users.clone(), tokens.clone()));

    info!("🔐 Authentication initialized at: {}", auth_db_path);
    info!("📚 Deck database initialized at: {}", deck_db_path);

    let app = routes::app(
        AppState { decks, users },
        AuthState::new(service),
        tokens,
    );

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flashdeck_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_data_path(filename: &str) -> String {
    // Anchor defaults to the crate directory so running from elsewhere
    // doesn't create a new empty DB in a different working directory.
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    base.join(filename).to_string_lossy().to_string()
}

fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return default_data_path(default_filename);
    };

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    // Treat relative paths as relative to the crate directory, not the cwd.
    base.join(p).to_string_lossy().to_string()
}

fn load_env() {
    // Standard dotenv search (cwd + parents), then the crate directory
    let _ = dotenv();

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let candidates = [manifest_dir.join(".env"), manifest_dir.join("../.env")];

    for p in candidates {
        if p.exists() {
            let _ = dotenv::from_path(&p);
        }
    }
}
