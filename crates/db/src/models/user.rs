//! User entity model and DTOs.

use formflow_core::types::{DbId, Timestamp};
use formflow_core::versions::ConfigSnapshot;
use serde::Serialize;
use sqlx::FromRow;

/// Role assigned to self-registered users.
pub const ROLE_ADMIN: i16 = 1;

/// A row from the `users` table.
///
/// The pinned configuration is stored as two flat columns.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub role: i16,
    pub config_flow_id: Option<String>,
    pub config_ids: Option<Vec<String>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// The configuration snapshot frozen at registration.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            flow_id: self.config_flow_id.clone(),
            config_ids: self.config_ids.clone(),
        }
    }
}

/// User representation for API responses, with the snapshot nested.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub role: i16,
    pub config: ConfigSnapshot,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            config: user.snapshot(),
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a user together with its snapshot.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub name: Option<String>,
    pub role: i16,
    pub config: ConfigSnapshot,
}
