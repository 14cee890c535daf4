#![allow(dead_code)]
//! Shared fixtures for the wiremock-backed integration tests.

use medisite_link::{Api, ApiClient, AuthState, CacheConfig, Persistence};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

pub struct Harness {
    pub server: MockServer,
    pub api: Api,
    pub auth: AuthState,
    pub persistence: Persistence,
}

pub async fn harness() -> Harness {
    harness_with(CacheConfig::default()).await
}

pub async fn harness_with(config: CacheConfig) -> Harness {
    let server = MockServer::start().await;
    let persistence = Persistence::new(Arc::new(medisite_link::MemoryStore::new()));
    let auth = AuthState::restore(persistence.clone());
    let client = ApiClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .token_store(auth.token_store().clone())
        .build()
        .expect("client should build");
    let api = Api::with_config(client, config);

    Harness {
        server,
        api,
        auth,
        persistence,
    }
}

pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "message": "OK", "data": data })
}

pub fn list_envelope(data: Value, total_count: u64, per_page: u64, current_page: u64) -> Value {
    let total_page = if per_page == 0 {
        0
    } else {
        total_count.div_ceil(per_page)
    };
    let count = data.as_array().map_or(0, |items| items.len());
    json!({
        "success": true,
        "message": "OK",
        "pagination": {
            "per_page": per_page,
            "total_count": total_count,
            "total_page": total_page,
            "current_page": current_page,
            "current_page_count": count,
            "next_page": if current_page < total_page { json!(current_page + 1) } else { Value::Null },
            "previous_page": if current_page > 1 { json!(current_page - 1) } else { Value::Null },
        },
        "data": data,
    })
}

pub fn admin_user() -> Value {
    json!({
        "id": 1,
        "name": "Dr. Rahman",
        "email": "admin@hospital.test",
        "email_verified_at": null,
        "is_suspended": false,
        "roles": [{ "id": 1, "name": "Admin", "slug": "admin" }],
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

pub fn blog(id: i64, title: &str) -> Value {
    json!({ "id": id, "title": title, "content": "...", "status": "active" })
}

pub fn doctor(id: i64, name: &str) -> Value {
    json!({ "id": id, "name": name, "status": "active" })
}
