//! Commands end to end against a mock CMS, with the session kept in a
//! temporary file.

use medisite_cli::{
    CLIError, CLISession, Command, FileStore, OutputFormat, SessionOptions,
};
use medisite_link::{CacheConfig, LinkTimeouts, Persistence};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(data: Value) -> Value {
    json!({ "success": true, "message": "OK", "data": data })
}

fn user(slug: &str) -> Value {
    json!({
        "id": 1,
        "name": "Dr. Rahman",
        "email": "admin@hospital.test",
        "roles": [{ "id": 1, "name": slug, "slug": slug }]
    })
}

fn session(server: &MockServer, session_file: &Path, format: OutputFormat) -> CLISession {
    let store = FileStore::open(session_file).unwrap();
    CLISession::new(
        SessionOptions {
            server_url: format!("{}/api", server.uri()),
            timeouts: LinkTimeouts::fast(),
            cache: CacheConfig::default(),
            format,
            color: false,
        },
        Persistence::new(Arc::new(store)),
    )
    .unwrap()
}

async fn mount_login(server: &MockServer, slug: &str) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "user": user(slug),
            "access_token": "tok-1",
            "refresh_token": "ref-1",
            "token_type": "Bearer"
        }))))
        .mount(server)
        .await;
}

fn login() -> Command {
    Command::Login {
        email: Some("admin@hospital.test".into()),
        password: Some("secret".into()),
    }
}

#[tokio::test]
async fn test_login_survives_process_restart() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("session.toml");
    mount_login(&server, "admin").await;
    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(user("admin"))))
        .expect(1)
        .mount(&server)
        .await;

    let output = session(&server, &file, OutputFormat::Table)
        .execute(login())
        .await
        .unwrap();
    assert_eq!(output, "Signed in as Dr. Rahman (admin)");

    // A new invocation reads the session file
    let next = session(&server, &file, OutputFormat::Table);
    assert!(next.auth().is_authenticated());
    let whoami = next.execute(Command::Whoami).await.unwrap();
    assert_eq!(whoami, "Dr. Rahman <admin@hospital.test>\nrole: admin");
}

#[tokio::test]
async fn test_list_renders_table_with_pagination() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/doctors"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "OK",
            "pagination": {
                "per_page": 1,
                "total_count": 3,
                "total_page": 3,
                "current_page": 2,
                "current_page_count": 1,
                "next_page": 3,
                "previous_page": 1
            },
            "data": [{ "id": 2, "name": "Dr. Karim", "department": "Cardiology", "status": "active" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = session(&server, &dir.path().join("s.toml"), OutputFormat::Table)
        .execute(Command::List {
            resource: "doctors".into(),
            page: 2,
            per_page: 1,
            status: None,
            search: None,
        })
        .await
        .unwrap();

    assert!(output.contains("Dr. Karim"));
    assert!(output.contains("Cardiology"));
    assert!(output.contains("Page 2 of 3 (3 total), next: --page 3"));
}

#[tokio::test]
async fn test_write_commands_require_a_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let err = session(&server, &dir.path().join("s.toml"), OutputFormat::Table)
        .execute(Command::Delete {
            resource: "blogs".into(),
            id: 4,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CLIError::Unauthorized(_)), "got {:?}", err);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_write_commands_require_admin_role() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_login(&server, "editor").await;

    let cli = session(&server, &dir.path().join("s.toml"), OutputFormat::Table);
    cli.execute(login()).await.unwrap();
    let err = cli
        .execute(Command::Create {
            resource: "blogs".into(),
            fields: vec!["title=Open day".into()],
            files: vec![],
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CLIError::Forbidden(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_create_sends_fields_as_json() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_login(&server, "admin").await;
    Mock::given(method("POST"))
        .and(path("/api/installment-rules"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_partial_json(json!({"title": "12 months", "months": 12})))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(json!({
            "id": 5,
            "title": "12 months",
            "months": 12
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let cli = session(&server, &dir.path().join("s.toml"), OutputFormat::Json);
    cli.execute(login()).await.unwrap();
    let output = cli
        .execute(Command::Create {
            resource: "installment-rules".into(),
            fields: vec!["title=12 months".into(), "months:=12".into()],
            files: vec![],
        })
        .await
        .unwrap();

    let record: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(record["id"], 5);
}

#[tokio::test]
async fn test_read_only_resources_reject_writes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_login(&server, "admin").await;

    let cli = session(&server, &dir.path().join("s.toml"), OutputFormat::Table);
    cli.execute(login()).await.unwrap();
    let err = cli
        .execute(Command::Delete {
            resource: "careers".into(),
            id: 1,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CLIError::ParseError(_)));
}

#[tokio::test]
async fn test_rejected_token_clears_the_session_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("s.toml");
    mount_login(&server, "admin").await;
    Mock::given(method("DELETE"))
        .and(path("/api/blogs/4"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthenticated."})))
        .mount(&server)
        .await;

    session(&server, &file, OutputFormat::Table)
        .execute(login())
        .await
        .unwrap();

    let cli = session(&server, &file, OutputFormat::Table);
    let err = cli
        .execute(Command::Delete {
            resource: "blogs".into(),
            id: 4,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CLIError::Unauthorized(_)));
    assert!(!cli.auth().is_authenticated());

    let contents = std::fs::read_to_string(&file).unwrap();
    assert!(!contents.contains("tok-1"));
}

#[tokio::test]
async fn test_contact_form_is_public() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path("/api/contact-messages"))
        .and(body_partial_json(json!({"name": "Ayesha", "message": "Visiting hours?"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(json!({
            "id": 31,
            "name": "Ayesha",
            "email": "ayesha@example.test",
            "message": "Visiting hours?"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let output = session(&server, &dir.path().join("s.toml"), OutputFormat::Table)
        .execute(Command::Contact {
            name: "Ayesha".into(),
            email: "ayesha@example.test".into(),
            message: "Visiting hours?".into(),
            phone: None,
            subject: None,
        })
        .await
        .unwrap();
    assert_eq!(output, "Message #31 sent");

    let received = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body.get("phone").is_none());
}

#[tokio::test]
async fn test_missing_gallery_banner() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/gallery-page-banner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .mount(&server)
        .await;

    let output = session(&server, &dir.path().join("s.toml"), OutputFormat::Table)
        .execute(Command::GalleryBanner)
        .await
        .unwrap();
    assert_eq!(output, "No gallery banner");
}
