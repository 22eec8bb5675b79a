//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool`. Writes that must be atomic take a transaction through
//! their `*_inner` helpers.

pub mod field_set_version_repo;
pub mod flow_version_repo;
pub mod user_details_repo;
pub mod user_repo;

pub use field_set_version_repo::FieldSetVersionRepo;
pub use flow_version_repo::FlowVersionRepo;
pub use user_details_repo::UserDetailsRepo;
pub use user_repo::UserRepo;

/// Serialize publishers of the same scope for the rest of the transaction.
///
/// Two concurrent publishes of one scope would otherwise both deactivate
/// before either inserts, and the second insert would trip the
/// single-active unique index.
pub(crate) async fn lock_publish_scope(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    key: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1)::bigint)")
        .bind(key)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
