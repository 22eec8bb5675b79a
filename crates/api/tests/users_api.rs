//! Integration tests for the `/api/v1/users` routes and snapshot pinning.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json, put_json};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn flow_body(title: &str) -> Value {
    json!({
        "form_data": [
            {"form_id": "pers_1", "title": title, "description": "About you", "theme": "blue"}
        ]
    })
}

fn text_field_set(parent_id: &str, name: &str) -> Value {
    json!({
        "parent_id": parent_id,
        "fields": [
            {"type": "text", "label": "Label", "name": name, "required": false, "enabled": true}
        ],
        "file_included": false,
        "other_config": {"loop": false}
    })
}

// ---------------------------------------------------------------------------
// Test: registration pins the active configuration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_user_records_snapshot(pool: PgPool) {
    let app = common::build_test_app(pool);
    let flow = body_json(post_json(app.clone(), "/api/v1/form/flows", flow_body("v1")).await).await;
    let body = text_field_set("pers_1", "a");
    let fields = body_json(post_json(app.clone(), "/api/v1/form/field-sets", body).await).await;

    let response = post_json(
        app,
        "/api/v1/users",
        json!({"email": "alice@example.com", "name": "Alice"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "alice@example.com");
    assert_eq!(json["data"]["config"]["flow_id"], flow["data"]["flow_id"]);
    assert_eq!(
        json["data"]["config"]["config_ids"],
        json!([fields["data"]["config_id"]])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_form_config_survives_republish(pool: PgPool) {
    let app = common::build_test_app(pool);
    let v1 = body_json(post_json(app.clone(), "/api/v1/form/flows", flow_body("v1")).await).await;
    post_json(app.clone(), "/api/v1/form/field-sets", text_field_set("pers_1", "old")).await;

    let user = body_json(
        post_json(app.clone(), "/api/v1/users", json!({"email": "bob@example.com"})).await,
    )
    .await;
    let user_id = user["data"]["id"].as_i64().unwrap();

    post_json(app.clone(), "/api/v1/form/flows", flow_body("v2")).await;
    post_json(app.clone(), "/api/v1/form/field-sets", text_field_set("pers_1", "new")).await;

    let uri = format!("/api/v1/users/{user_id}/form-config");
    let pinned = body_json(get(app.clone(), &uri).await).await;
    assert_eq!(pinned["data"]["flow"]["flow_id"], v1["data"]["flow_id"]);
    assert_eq!(pinned["data"]["field_sets"][0]["fields"][0]["name"], "old");
    assert_eq!(pinned["data"]["field_sets"][0]["is_active"], false);

    let latest = body_json(get(app, "/api/v1/form/config").await).await;
    assert_eq!(latest["data"]["flow"]["steps"][0]["title"], "v2");
    assert_eq!(latest["data"]["field_sets"][0]["fields"][0]["name"], "new");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_created_before_publish_pins_empty_field_sets(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = body_json(
        post_json(app.clone(), "/api/v1/users", json!({"email": "early@example.com"})).await,
    )
    .await;
    assert!(user["data"]["config"]["flow_id"].is_null());
    assert_eq!(user["data"]["config"]["config_ids"], json!([]));

    post_json(app.clone(), "/api/v1/form/flows", flow_body("later")).await;
    post_json(app.clone(), "/api/v1/form/field-sets", text_field_set("pers_1", "x")).await;

    let user_id = user["data"]["id"].as_i64().unwrap();
    let json = body_json(get(app, &format!("/api/v1/users/{user_id}/form-config")).await).await;
    // No pinned flow falls back to the latest; pinned-empty field-sets stay empty.
    assert_eq!(json["data"]["flow"]["steps"][0]["title"], "later");
    assert_eq!(json["data"]["field_sets"], json!([]));
}

// ---------------------------------------------------------------------------
// Test: errors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_returns_409(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({"email": "dup@example.com"});
    post_json(app.clone(), "/api/v1/users", body.clone()).await;

    let response = post_json(app, "/api/v1/users", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_email_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/users", json!({"email": "not-an-email"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_user_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/users/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, "/api/v1/users/999999/form-config").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: submitted answers
// ---------------------------------------------------------------------------

async fn create_user(app: axum::Router, email: &str) -> i64 {
    let user = body_json(post_json(app, "/api/v1/users", json!({"email": email})).await).await;
    user["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_details_are_saved_and_merged(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user_id = create_user(app.clone(), "carol@example.com").await;
    let uri = format!("/api/v1/users/{user_id}/details");

    let before = body_json(get(app.clone(), &uri).await).await;
    assert!(before["data"].is_null());

    let response = put_json(
        app.clone(),
        &uri,
        json!({
            "first_name": "Carol",
            "gender": "f",
            "education_details": [
                {"education_type": "bachelor", "name_institution": "Uni", "edu_grade": "A"}
            ],
            "id_proof_upload": "id_proof_upload_1"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let saved = body_json(response).await;
    assert_eq!(saved["data"]["user_id"], user_id);
    assert_eq!(saved["data"]["education_details"][0]["name_institution"], "Uni");
    assert_eq!(saved["data"]["pro_details"], json!([]));

    put_json(
        app.clone(),
        &uri,
        json!({"last_name": "", "pro_details": [{"company_name": "Acme", "designation": null}]}),
    )
    .await;

    let json = body_json(get(app, &uri).await).await;
    assert_eq!(json["data"]["first_name"], "Carol");
    assert_eq!(json["data"]["last_name"], "");
    assert_eq!(json["data"]["education_details"][0]["edu_grade"], "A");
    assert_eq!(json["data"]["pro_details"][0]["company_name"], "Acme");
    assert_eq!(json["data"]["id_proof_upload"], "id_proof_upload_1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_details_for_unknown_user_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = put_json(app, "/api/v1/users/999999/details", json!({"first_name": "X"})).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_details_with_bad_list_shape_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user_id = create_user(app.clone(), "dave@example.com").await;

    let uri = format!("/api/v1/users/{user_id}/details");
    let response = put_json(app, &uri, json!({"education_details": "bachelor"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}
