//! Capturing the configuration snapshot frozen onto a new user.

use std::sync::Arc;

use crate::error::CoreResult;
use crate::resolver::ConfigResolver;
use crate::versions::ConfigSnapshot;

/// Records which versions are active at user-creation time.
///
/// Only ids are captured. The caller persists the snapshot together with the
/// new user; if user creation fails the snapshot is simply dropped.
pub struct SnapshotPinner {
    resolver: Arc<ConfigResolver>,
}

impl SnapshotPinner {
    pub fn new(resolver: Arc<ConfigResolver>) -> Self {
        Self { resolver }
    }

    pub async fn capture_snapshot(&self) -> CoreResult<ConfigSnapshot> {
        let snapshot = self.resolver.resolve_latest().await?.snapshot();
        tracing::debug!(
            flow_id = snapshot.flow_id.as_deref(),
            config_ids = snapshot.config_ids.as_ref().map_or(0, Vec::len),
            "Captured configuration snapshot"
        );
        Ok(snapshot)
    }
}
