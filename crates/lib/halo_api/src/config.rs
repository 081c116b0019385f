//! API server configuration.

use std::path::PathBuf;
use std::time::Duration;

use halo_core::auth::cache::DEFAULT_IDLE_TTL;
use halo_core::auth::gate::DEFAULT_SAFETY_MARGIN_SECS;
use halo_core::auth::jwt::DEFAULT_TOKEN_LIFETIME_SECS;
use halo_core::auth::password::DEFAULT_BCRYPT_COST;

/// Default per-call service deadline.
pub const DEFAULT_CONTEXT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub jwt_expire_secs: i64,
    /// Subtracted from a token's remaining lifetime before it is cached.
    pub token_cache_margin_secs: i64,
    /// Sliding idle window for cached tokens.
    pub token_cache_idle_secs: u64,
    pub bcrypt_cost: u32,
    /// Deadline applied to every service call.
    pub context_timeout_secs: u64,
    /// Directory uploaded images are written to.
    pub upload_dir: PathBuf,
    /// Base URL uploaded images are served under.
    pub public_base_url: String,
}

impl ApiConfig {
    pub fn context_timeout(&self) -> Duration {
        Duration::from_secs(self.context_timeout_secs)
    }

    pub fn token_cache_idle(&self) -> Duration {
        Duration::from_secs(self.token_cache_idle_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            pg_connection_url: "postgres://localhost:5432/halo".into(),
            jwt_secret: String::new(),
            jwt_expire_secs: DEFAULT_TOKEN_LIFETIME_SECS,
            token_cache_margin_secs: DEFAULT_SAFETY_MARGIN_SECS,
            token_cache_idle_secs: DEFAULT_IDLE_TTL.as_secs(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            context_timeout_secs: DEFAULT_CONTEXT_TIMEOUT_SECS,
            upload_dir: PathBuf::from("uploads"),
            public_base_url: "http://127.0.0.1:8080/uploads".into(),
        }
    }
}
