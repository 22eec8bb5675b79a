//! Configuration versioning and resolution engine for the onboarding form.
//!
//! Flow layouts and per-step field-sets are stored as append-only version
//! logs. Publishing deactivates the current version of a scope and appends a
//! new active one; resolution reads either the active versions or the exact
//! versions pinned on a user at registration time.

pub mod error;
pub mod fields;
pub mod ids;
pub mod publisher;
pub mod resolver;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod versions;
