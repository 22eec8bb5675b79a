//! End-to-end tests of the versioning engine over `PgConfigStore`.
//!
//! - Concurrent publishes of one scope leave exactly one active version
//! - Publishing one scope never disturbs another
//! - A user's pinned snapshot keeps resolving to the same versions
//! - Driver errors map onto the storage port's error kinds

use std::sync::Arc;

use assert_matches::assert_matches;
use formflow_core::error::CoreError;
use formflow_core::fields::{FieldInput, FieldOption, OtherConfig};
use formflow_core::publisher::VersionPublisher;
use formflow_core::resolver::ConfigResolver;
use formflow_core::snapshot::SnapshotPinner;
use formflow_core::store::{ConfigStore, FlowFilter, StoreError};
use formflow_core::versions::{NewFieldSet, NewFlow};
use formflow_db::models::user::{CreateUser, ROLE_ADMIN};
use formflow_db::repositories::UserRepo;
use formflow_db::PgConfigStore;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Engine {
    store: Arc<PgConfigStore>,
    publisher: Arc<VersionPublisher>,
    resolver: Arc<ConfigResolver>,
    pinner: SnapshotPinner,
}

fn engine(pool: PgPool) -> Engine {
    let store = Arc::new(PgConfigStore::new(pool));
    let resolver = Arc::new(ConfigResolver::new(store.clone()));
    Engine {
        publisher: Arc::new(VersionPublisher::new(store.clone())),
        pinner: SnapshotPinner::new(resolver.clone()),
        resolver,
        store,
    }
}

fn flow(title: &str) -> NewFlow {
    NewFlow {
        flow_id: None,
        steps: vec![json!({
            "form_id": "pers_1",
            "title": title,
            "description": "About you",
            "theme": "blue",
        })],
    }
}

fn gender_field_set(parent_id: &str) -> NewFieldSet {
    NewFieldSet {
        config_id: None,
        parent_id: parent_id.to_string(),
        fields: vec![FieldInput {
            field_type: "radio".to_string(),
            label: "Gender".to_string(),
            name: "gender".to_string(),
            class_name: None,
            required: true,
            enabled: true,
            values: Some(vec![
                FieldOption {
                    value: "f".to_string(),
                    label: "Female".to_string(),
                },
                FieldOption {
                    value: "m".to_string(),
                    label: "Male".to_string(),
                },
            ]),
        }],
        file_included: false,
        other_config: OtherConfig::default(),
    }
}

// ---------------------------------------------------------------------------
// Test: single active version under concurrency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_flow_publishes_leave_one_active(pool: PgPool) {
    let engine = engine(pool);

    let publishes = (0..8).map(|i| {
        let publisher = engine.publisher.clone();
        async move { publisher.publish_flow(flow(&format!("v{i}"))).await }
    });
    let results = futures::future::join_all(publishes).await;
    assert!(results.iter().all(Result::is_ok), "all publishes succeed");

    let active = engine.store.find_flows(&FlowFilter::Active).await.unwrap();
    assert_eq!(active.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_field_set_publishes_per_scope(pool: PgPool) {
    let engine = engine(pool);

    let publishes = ["pers_1", "edu_2", "pers_1", "edu_2", "pers_1"].map(|scope| {
        let publisher = engine.publisher.clone();
        async move { publisher.publish_field_set(gender_field_set(scope)).await }
    });
    for result in futures::future::join_all(publishes).await {
        result.unwrap();
    }

    let latest = engine.resolver.resolve_latest().await.unwrap();
    let groups = latest.grouped_by_parent();
    assert_eq!(groups["pers_1"].len(), 1);
    assert_eq!(groups["edu_2"].len(), 1);
}

// ---------------------------------------------------------------------------
// Test: resolution and snapshots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_latest_orders_by_default_scopes(pool: PgPool) {
    let engine = engine(pool);
    engine.publisher.publish_field_set(gender_field_set("doc_4")).await.unwrap();
    engine.publisher.publish_field_set(gender_field_set("pers_1")).await.unwrap();
    engine.publisher.publish_field_set(gender_field_set("custom")).await.unwrap();

    let latest = engine.resolver.resolve_latest().await.unwrap();
    let scopes: Vec<&str> = latest.field_sets.iter().map(|fs| fs.parent_id.as_str()).collect();
    assert_eq!(scopes, vec!["pers_1", "doc_4"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_snapshot_survives_republish(pool: PgPool) {
    let engine = engine(pool.clone());
    let v1 = engine.publisher.publish_flow(flow("first")).await.unwrap();
    let fs1 = engine
        .publisher
        .publish_field_set(gender_field_set("pers_1"))
        .await
        .unwrap();

    let snapshot = engine.pinner.capture_snapshot().await.unwrap();
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            email: "alice@example.com".to_string(),
            name: Some("Alice".to_string()),
            role: ROLE_ADMIN,
            config: snapshot,
        },
    )
    .await
    .unwrap();

    engine.publisher.publish_flow(flow("second")).await.unwrap();
    engine
        .publisher
        .publish_field_set(gender_field_set("pers_1"))
        .await
        .unwrap();

    let reloaded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    let pinned = engine
        .resolver
        .resolve_snapshot(&reloaded.snapshot())
        .await
        .unwrap();
    assert_eq!(pinned.flow.unwrap().flow_id, v1.flow_id);
    assert_eq!(pinned.field_sets.len(), 1);
    assert_eq!(pinned.field_sets[0].config_id, fs1.config_id);
    assert!(!pinned.field_sets[0].is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_created_before_any_publish(pool: PgPool) {
    let engine = engine(pool.clone());
    let snapshot = engine.pinner.capture_snapshot().await.unwrap();
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            email: "early@example.com".to_string(),
            name: None,
            role: ROLE_ADMIN,
            config: snapshot,
        },
    )
    .await
    .unwrap();

    assert_eq!(user.config_flow_id, None);
    assert_eq!(user.config_ids, Some(Vec::new()));
    assert!(UserRepo::find_by_email(&pool, "early@example.com")
        .await
        .unwrap()
        .is_some());
}

// ---------------------------------------------------------------------------
// Test: error mapping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_id_maps_to_duplicate(pool: PgPool) {
    let engine = engine(pool);
    let mut input = flow("a");
    input.flow_id = Some("fixed".to_string());
    engine.publisher.publish_flow(input.clone()).await.unwrap();

    let err = engine.publisher.publish_flow(input).await.unwrap_err();
    assert_matches!(
        err,
        CoreError::Storage {
            source: StoreError::Duplicate(ref constraint),
            ..
        } if constraint == "uq_form_flows_flow_id"
    );

    // The failed publish rolled back; the first version is still active.
    let active = engine.store.find_flows(&FlowFilter::Active).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].flow_id, "fixed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_pinned_flow_is_not_found(pool: PgPool) {
    let engine = engine(pool);
    let err = engine
        .resolver
        .resolve_by_snapshot(Some("ghost"), None)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "FlowVersion", .. });
}
