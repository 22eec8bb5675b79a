use std::sync::Arc;

use formflow_core::publisher::VersionPublisher;
use formflow_core::resolver::{ConfigResolver, ResolverConfig};
use formflow_core::snapshot::SnapshotPinner;
use formflow_db::PgConfigStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the engine components sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: formflow_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub publisher: Arc<VersionPublisher>,
    pub resolver: Arc<ConfigResolver>,
    pub pinner: Arc<SnapshotPinner>,
}

impl AppState {
    /// Wire the versioning engine over a Postgres-backed store.
    pub fn new(pool: formflow_db::DbPool, config: ServerConfig) -> Self {
        let store = Arc::new(PgConfigStore::new(pool.clone()));
        let resolver = Arc::new(ConfigResolver::with_config(
            store.clone(),
            ResolverConfig {
                default_scopes: config.form_default_scopes.clone(),
            },
        ));

        Self {
            pool,
            config: Arc::new(config),
            publisher: Arc::new(VersionPublisher::new(store)),
            pinner: Arc::new(SnapshotPinner::new(resolver.clone())),
            resolver,
        }
    }
}
