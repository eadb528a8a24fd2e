//! Connection handling for the grant and catalog stores.
//!
//! The engine and assignment service never see this layer directly;
//! they work against the repository traits. Only the server binary
//! (and operational tooling) opens a remote connection here.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

/// Connection settings, resolved from `WARDEN_DB_*` environment
/// variables with local-development defaults.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address, host and port only (`WARDEN_DB_URL`).
    pub url: String,
    /// Namespace holding all Warden databases (`WARDEN_DB_NAMESPACE`).
    pub namespace: String,
    /// Database name (`WARDEN_DB_DATABASE`).
    pub database: String,
    /// Root username (`WARDEN_DB_USERNAME`).
    pub username: String,
    /// Root password (`WARDEN_DB_PASSWORD`).
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "warden".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Reads the `WARDEN_DB_*` variables, falling back to the default
    /// for each one that is unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |key: &str, default: String| std::env::var(key).unwrap_or(default);
        Self {
            url: var("WARDEN_DB_URL", defaults.url),
            namespace: var("WARDEN_DB_NAMESPACE", defaults.namespace),
            database: var("WARDEN_DB_DATABASE", defaults.database),
            username: var("WARDEN_DB_USERNAME", defaults.username),
            password: var("WARDEN_DB_PASSWORD", defaults.password),
        }
    }
}

/// Owns the authenticated client handle the repositories are built
/// from.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Opens the WebSocket connection, signs in as root, and selects
    /// the configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "connecting to authorization store"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("authorization store connected");

        Ok(Self { db })
    }

    /// The underlying client handle, for building repositories and
    /// running migrations.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
