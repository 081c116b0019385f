//! Halo API server binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::info;

use halo_api::blob::LocalBlobStore;
use halo_api::config::{ApiConfig, DEFAULT_CONTEXT_TIMEOUT_SECS};
use halo_core::auth::cache::{DEFAULT_SWEEP_INTERVAL, TokenCache};
use halo_core::auth::gate::{Authenticator, DEFAULT_SAFETY_MARGIN_SECS};
use halo_core::auth::jwt::{DEFAULT_TOKEN_LIFETIME_SECS, TokenIssuer, resolve_jwt_secret};
use halo_core::auth::password::{Bcrypt, DEFAULT_BCRYPT_COST};

/// CLI arguments for the API server. Every flag can also be set through the
/// environment or a `.env` file.
#[derive(Parser, Debug)]
#[command(name = "halo_api_server", about = "Halo API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8080")]
    bind_addr: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/halo"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 10)]
    max_connections: u32,

    /// JWT signing secret. Generated and persisted when unset.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Access token lifetime in seconds.
    #[arg(long, env = "JWT_EXPIRE_SECS", default_value_t = DEFAULT_TOKEN_LIFETIME_SECS)]
    jwt_expire_secs: i64,

    /// Seconds subtracted from a token's remaining lifetime before caching it.
    #[arg(
        long,
        env = "TOKEN_CACHE_MARGIN_SECS",
        default_value_t = DEFAULT_SAFETY_MARGIN_SECS,
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    token_cache_margin_secs: i64,

    /// Idle seconds after which a cached token is dropped.
    #[arg(long, env = "TOKEN_CACHE_IDLE_SECS", default_value_t = 900)]
    token_cache_idle_secs: u64,

    #[arg(long, env = "BCRYPT_COST", default_value_t = DEFAULT_BCRYPT_COST)]
    bcrypt_cost: u32,

    /// Deadline in seconds for each service call.
    #[arg(long, env = "CONTEXT_TIMEOUT_SECS", default_value_t = DEFAULT_CONTEXT_TIMEOUT_SECS)]
    context_timeout_secs: u64,

    /// Directory uploaded images are written to.
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Public base URL of the upload directory.
    #[arg(
        long,
        env = "PUBLIC_BASE_URL",
        default_value = "http://127.0.0.1:8080/uploads"
    )]
    public_base_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,halo_api=debug,halo_core=debug"))?,
        )
        .init();

    let args = Args::parse();

    info!(bind_addr = %args.bind_addr, "starting halo_api_server");
    info!(max_connections = args.max_connections, "configuring connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&args.database_url)
        .await?;

    info!("running database migrations");
    halo_api::migrate(&pool).await?;

    let config = ApiConfig {
        bind_addr: args.bind_addr,
        pg_connection_url: args.database_url,
        jwt_secret: resolve_jwt_secret(args.jwt_secret.as_deref()),
        jwt_expire_secs: args.jwt_expire_secs,
        token_cache_margin_secs: args.token_cache_margin_secs,
        token_cache_idle_secs: args.token_cache_idle_secs,
        bcrypt_cost: args.bcrypt_cost,
        context_timeout_secs: args.context_timeout_secs,
        upload_dir: args.upload_dir,
        public_base_url: args.public_base_url,
    };

    let shutdown = CancellationToken::new();

    let cache = Arc::new(TokenCache::with_idle_ttl(config.token_cache_idle()));
    let sweeper = cache.spawn_sweep_task(DEFAULT_SWEEP_INTERVAL, shutdown.clone());

    let authenticator = Arc::new(Authenticator::new(
        TokenIssuer::new(
            config.jwt_secret.as_bytes(),
            chrono::Duration::seconds(config.jwt_expire_secs),
        ),
        Arc::clone(&cache),
        chrono::Duration::seconds(config.token_cache_margin_secs),
    ));

    let state = halo_api::AppState {
        pool: pool.clone(),
        authenticator,
        hasher: Arc::new(Bcrypt::new(config.bcrypt_cost)),
        blob_store: Arc::new(LocalBlobStore::new(
            &config.upload_dir,
            &config.public_base_url,
        )),
        config: config.clone(),
    };

    let app = halo_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            info!("shutdown signal received");
            shutdown.cancel();
        }
    });

    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move { shutdown.cancelled().await }
        })
        .await;

    shutdown.cancel();
    let _ = sweeper.await;
    cache.flush();
    pool.close().await;
    info!("halo_api_server stopped");

    serve_result?;
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_defaults_to_safety_margin() {
        let args = Args::try_parse_from(["halo_api_server"]).unwrap();
        assert_eq!(args.token_cache_margin_secs, DEFAULT_SAFETY_MARGIN_SECS);
    }

    #[test]
    fn negative_margin_is_rejected() {
        assert!(
            Args::try_parse_from(["halo_api_server", "--token-cache-margin-secs", "-30"]).is_err()
        );
        let args =
            Args::try_parse_from(["halo_api_server", "--token-cache-margin-secs", "0"]).unwrap();
        assert_eq!(args.token_cache_margin_secs, 0);
    }
}
