//! Login, logout and profile refresh through the auth state machine.

mod common;

use common::{admin_user, doctor, envelope, harness};
use medisite_link::endpoints::DOCTORS;
use medisite_link::{AuthState, LinkError, RouteGuard, GuardDecision};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn login_payload() -> serde_json::Value {
    envelope(json!({
        "user": admin_user(),
        "access_token": "access-abc",
        "refresh_token": "refresh-xyz",
        "token_type": "Bearer"
    }))
}

#[tokio::test]
async fn test_login_persists_session_and_authorizes_requests() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_partial_json(json!({"email": "admin@hospital.test"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_payload()))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/doctors/1"))
        .and(header("authorization", "Bearer access-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(doctor(1, "Dr. Alam"))))
        .expect(1)
        .mount(&h.server)
        .await;

    let user = h
        .auth
        .login(&h.api, "admin@hospital.test", "secret")
        .await
        .unwrap();
    assert!(user.is_admin());
    assert!(h.auth.is_authenticated());

    DOCTORS.fetch(&h.api, 1).await.unwrap();

    // A fresh process sees the same session
    let restored = AuthState::restore(h.persistence.clone()).session();
    assert!(restored.is_authenticated());
    assert_eq!(restored.token.as_deref(), Some("access-abc"));
    assert_eq!(
        h.auth.token_store().get_refresh_token().as_deref(),
        Some("refresh-xyz")
    );
}

#[tokio::test]
async fn test_rejected_login_stays_anonymous() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"success": false, "message": "Invalid credentials"})),
        )
        .mount(&h.server)
        .await;

    let err = h
        .auth
        .login(&h.api, "admin@hospital.test", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err, LinkError::AuthenticationError("Invalid credentials".into()));
    assert!(!h.auth.is_authenticated());
    assert!(!h.auth.token_store().has_token());
}

#[tokio::test]
async fn test_logout_clears_locally_even_if_server_fails() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_payload()))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .and(header("authorization", "Bearer access-abc"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&h.server)
        .await;

    h.auth.login(&h.api, "admin@hospital.test", "secret").await.unwrap();
    h.auth.logout_remote(&h.api).await;

    assert!(!h.auth.is_authenticated());
    assert!(!AuthState::restore(h.persistence.clone()).is_authenticated());
    assert_eq!(h.api.cached_len(), 0);
    assert!(matches!(
        RouteGuard::default().check(&h.auth.session(), "/admin/blogs"),
        GuardDecision::Redirect { .. }
    ));
}

#[tokio::test]
async fn test_refresh_profile_merges_server_user() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_payload()))
        .mount(&h.server)
        .await;
    let mut renamed = admin_user();
    renamed["name"] = json!("Prof. Dr. Rahman");
    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(renamed)))
        .expect(1)
        .mount(&h.server)
        .await;

    h.auth.login(&h.api, "admin@hospital.test", "secret").await.unwrap();
    let mut changes = h.auth.subscribe();
    let _ = changes.borrow_and_update();

    let user = h.auth.refresh_profile(&h.api).await.unwrap().unwrap();
    assert_eq!(user.name, "Prof. Dr. Rahman");
    assert!(changes.has_changed().unwrap());

    let restored = AuthState::restore(h.persistence.clone()).session();
    assert_eq!(restored.user.unwrap().name, "Prof. Dr. Rahman");
}

#[tokio::test]
async fn test_refresh_profile_while_anonymous_does_nothing() {
    let h = harness().await;
    let result = h.auth.refresh_profile(&h.api).await.unwrap();
    assert!(result.is_none());
    assert!(h.server.received_requests().await.unwrap().is_empty());
}
