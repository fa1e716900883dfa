use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use workshop_api::config::{AppConfig, Environment};
use workshop_api::services::NewUser;
use workshop_api::models::UserRole;
use workshop_api::state::AppState;
use workshop_api::store::memory::MemoryStore;
use workshop_api::store::postgres::PgStore;
use workshop_api::store::Stores;

#[derive(Parser)]
#[command(name = "workshop-api", about = "Workshop management back office API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (the default)
    Serve,
    /// Create a user account
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// ADMIN or MECHANIC
        #[arg(long, default_value = "MECHANIC")]
        role: String,
        #[arg(long)]
        email: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.environment == Environment::Production && config.security.jwt_secret.is_empty() {
        bail!("WORKSHOP_JWT_SECRET must be set in production");
    }

    let stores = build_stores(&config).await?;

    match Cli::parse().command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, stores).await,
        Command::CreateUser {
            username,
            password,
            role,
            email,
        } => create_user(stores, username, password, role, email).await,
    }
}

async fn build_stores(config: &AppConfig) -> Result<Stores> {
    match &config.database.url {
        Some(url) => {
            let store = PgStore::connect(url, config.database.max_connections)
                .await
                .context("failed to connect to Postgres")?;
            tracing::info!("using Postgres store");
            Ok(store.stores())
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-process memory store");
            Ok(MemoryStore::new().stores())
        }
    }
}

async fn serve(config: AppConfig, stores: Stores) -> Result<()> {
    let port = config.server.port;
    let state = AppState::new(config, stores);

    if state.config.security.seed_dev_admin {
        state
            .users
            .ensure_dev_admin()
            .await
            .map_err(|e| anyhow::anyhow!("failed to seed dev admin: {e}"))?;
    }

    let app = workshop_api::router(state);

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("workshop API listening on http://{bind_addr}");
    axum::serve(listener, app).await.context("server error")
}

async fn create_user(
    stores: Stores,
    username: String,
    password: String,
    role: String,
    email: Option<String>,
) -> Result<()> {
    let role: UserRole = role
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let state_users = workshop_api::services::UserService::new(stores);
    let user = state_users
        .create_user(NewUser {
            firstname: None,
            surname: None,
            email,
            username,
            password,
            roles: vec![role],
        })
        .await
        .map_err(|e| anyhow::anyhow!("failed to create user: {e}"))?;

    println!("created user {} (id {})", user.username, user.id);
    Ok(())
}
