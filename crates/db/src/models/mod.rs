//! Row models and DTOs for each table.
//!
//! Each submodule contains:
//! - A `FromRow` struct matching the table columns.
//! - A create DTO for inserts.
//! - Conversions into the engine's domain types where one exists.

pub mod field_set_version;
pub mod flow_version;
pub mod user;
pub mod user_details;
