mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::{sqlite_backend, BASE_URL};
use notebox::{
    backend::{Backend, SqliteBackend},
    build_router,
    models::NoteFormData,
    AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const STRONG: &str = "Abcdef1!";

struct TestApp {
    router: Router,
    backend: Arc<SqliteBackend>,
    _uploads: TempDir,
}

async fn test_app() -> TestApp {
    let (backend, uploads) = sqlite_backend(chrono::Duration::minutes(60)).await;
    let state = AppState::new(backend.clone());
    state.gate.initialize().await.unwrap();

    TestApp {
        router: build_router(state, uploads.path()),
        backend,
        _uploads: uploads,
    }
}

impl TestApp {
    async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    async fn upload(&self, uri: &str, bytes: &'static [u8]) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/octet-stream")
                    .body(Body::from(bytes))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn signed_in(self) -> Self {
        self.sign_up("me@example.com").await;
        self
    }

    async fn sign_up(&self, email: &str) {
        let (status, _) = self
            .post(
                "/api/v1/auth/signup",
                json!({ "email": email, "password": "correct horse" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    async fn log_in(&self, email: &str) {
        let (status, _) = self
            .post(
                "/api/v1/auth/login",
                json!({ "email": email, "password": "correct horse" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn log_out(&self) {
        let (status, _) = self.post("/api/v1/auth/logout", json!({})).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

fn titles(body: &Value) -> Vec<String> {
    body["notes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app().await;
    let (status, body) = app.get("/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn closed_workspace_rejects_note_routes() {
    let app = test_app().await;

    let (status, body) = app.get("/api/v1/notes").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "not_authenticated");

    let (status, _) = app.post("/api/v1/notes", json!({ "title": "T" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn developer_access_opens_the_gate_without_identity() {
    let app = test_app().await;

    let (status, body) = app.post("/api/v1/auth/developer", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_authenticated"], true);
    assert_eq!(body["is_developer_access"], true);
    assert!(body["user"].is_null());

    // The gate is open but the backend has no session to scope rows by.
    let (status, body) = app.get("/api/v1/notes").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "not_authenticated");

    let (status, _) = app.post("/api/v1/auth/logout", json!({})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = app.get("/api/v1/auth/session").await;
    assert_eq!(body["is_authenticated"], false);
    assert_eq!(body["is_developer_access"], false);
}

#[tokio::test]
async fn signup_opens_a_real_session() {
    let app = test_app().await.signed_in().await;

    let (status, body) = app.get("/api/v1/auth/session").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_authenticated"], true);
    assert_eq!(body["is_developer_access"], false);
    assert_eq!(body["user"]["email"], "me@example.com");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = test_app().await.signed_in().await;

    let (status, body) = app
        .post(
            "/api/v1/auth/login",
            json!({ "email": "me@example.com", "password": "wrong password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid login credentials");
}

#[tokio::test]
async fn oauth_is_rejected_by_the_bundled_backend() {
    let app = test_app().await;
    let (status, body) = app.post("/api/v1/auth/oauth/github", json!({})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&body), "backend_error");
}

#[tokio::test]
async fn saved_note_is_listed_and_deleted_note_is_gone() {
    let app = test_app().await.signed_in().await;

    let (status, note) = app
        .post(
            "/api/v1/notes",
            json!({ "title": "T", "content": "body", "tags": ["work", "Work", " "] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(note["tags"], json!(["work"]));
    assert_eq!(note["is_password_protected"], false);

    let (_, body) = app.get("/api/v1/notes").await;
    assert_eq!(titles(&body), vec!["T"]);
    assert_eq!(body["tags"], json!(["work"]));

    let id = note["id"].as_str().unwrap();
    let (status, _) = app.delete(&format!("/api/v1/notes/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.get("/api/v1/notes").await;
    assert!(titles(&body).is_empty());

    let (status, _) = app.delete(&format!("/api/v1/notes/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notes_filter_by_folder_tag_and_search() {
    let app = test_app().await.signed_in().await;

    let (status, folder) = app.post("/api/v1/folders", json!({ "name": " Work " })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(folder["name"], "Work");
    let folder_id = folder["id"].as_str().unwrap();

    app.post(
        "/api/v1/notes",
        json!({ "title": "Standup", "content": "yesterday", "folder_id": folder_id }),
    )
    .await;
    app.post(
        "/api/v1/notes",
        json!({ "title": "Groceries", "content": "Milk and eggs", "tags": ["home"] }),
    )
    .await;

    let (_, body) = app.get(&format!("/api/v1/notes?folder_id={folder_id}")).await;
    assert_eq!(titles(&body), vec!["Standup"]);

    let (_, body) = app.get("/api/v1/notes?tag=home").await;
    assert_eq!(titles(&body), vec!["Groceries"]);

    let (_, body) = app.get("/api/v1/notes?search=MILK").await;
    assert_eq!(titles(&body), vec!["Groceries"]);

    let (_, body) = app.get("/api/v1/notes?search=&tag=").await;
    assert_eq!(titles(&body).len(), 2);

    let (_, body) = app.get("/api/v1/tags").await;
    assert_eq!(body["tags"], json!(["home"]));

    let (_, body) = app.get("/api/v1/folders").await;
    assert_eq!(body["folders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn note_in_unknown_folder_is_rejected() {
    let app = test_app().await.signed_in().await;
    let (status, body) = app
        .post("/api/v1/notes", json!({ "title": "T", "folder_id": "missing" }))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&body), "backend_error");
}

#[tokio::test]
async fn blank_folder_name_is_rejected() {
    let app = test_app().await.signed_in().await;
    let (status, body) = app.post("/api/v1/folders", json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Folder name is required");
}

#[tokio::test]
async fn editor_validation_errors() {
    let app = test_app().await.signed_in().await;

    let (status, body) = app.post("/api/v1/notes", json!({ "title": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Note title is required");

    let (status, body) = app
        .post("/api/v1/notes", json!({ "title": "T", "is_password_protected": true }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Password is required when password protection is enabled"
    );

    let (status, body) = app
        .post(
            "/api/v1/notes",
            json!({ "title": "T", "is_password_protected": true, "password": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");
}

#[tokio::test]
async fn protected_note_hides_content_until_unlocked() {
    let app = test_app().await.signed_in().await;

    let (status, note) = app
        .post(
            "/api/v1/notes",
            json!({
                "title": "Diary",
                "content": "secret",
                "is_password_protected": true,
                "password": STRONG
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(note["is_password_protected"], true);
    for field in ["password", "password_hash", "password_salt"] {
        assert!(note.get(field).is_none(), "{field} leaked");
    }
    let id = note["id"].as_str().unwrap().to_string();

    let (_, body) = app.get("/api/v1/notes").await;
    assert!(body["notes"][0]["content"].is_null());

    // Search still looks at protected content.
    let (_, body) = app.get("/api/v1/notes?search=secret").await;
    assert_eq!(titles(&body), vec!["Diary"]);

    let unlock = format!("/api/v1/notes/{id}/unlock");
    let (status, body) = app.post(&unlock, json!({ "password": "nope" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Incorrect password for this note");

    let (status, _) = app.post(&unlock, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post(&unlock, json!({ "password": STRONG })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "secret");
}

#[tokio::test]
async fn editing_protected_note_needs_current_password() {
    let app = test_app().await.signed_in().await;

    let (_, note) = app
        .post(
            "/api/v1/notes",
            json!({ "title": "Diary", "is_password_protected": true, "password": STRONG }),
        )
        .await;
    let uri = format!("/api/v1/notes/{}", note["id"].as_str().unwrap());

    let (status, body) = app
        .put(&uri, json!({ "title": "Renamed", "is_password_protected": true }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "access_denied");

    let (status, body) = app
        .put(
            &uri,
            json!({
                "title": "Renamed",
                "is_password_protected": true,
                "current_password": STRONG
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Renamed");
    assert_eq!(body["is_password_protected"], true);

    // The kept credential still unlocks the note.
    let (status, _) = app
        .post(&format!("{uri}/unlock"), json!({ "password": STRONG }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .put(&uri, json!({ "title": "Open", "current_password": STRONG }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_password_protected"], false);
}

#[tokio::test]
async fn updating_missing_note_is_not_found() {
    let app = test_app().await.signed_in().await;
    let (status, body) = app.put("/api/v1/notes/missing", json!({ "title": "T" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "not_found");
}

#[tokio::test]
async fn password_strength_report() {
    let app = test_app().await;

    let (status, body) = app
        .post("/api/v1/password/strength", json!({ "password": "abc" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert!(body["missing"]
        .as_array()
        .unwrap()
        .contains(&json!("min_length")));

    let (_, body) = app
        .post("/api/v1/password/strength", json!({ "password": STRONG }))
        .await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["message"], "Password is strong");
}

#[tokio::test]
async fn photo_upload_returns_public_url_and_is_served() {
    let app = test_app().await.signed_in().await;

    let (status, body) = app
        .upload("/api/v1/attachments/photo?filename=cat.PNG", b"not really a png")
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("http://localhost:3000/files/"), "{url}");
    assert!(url.ends_with(".png"), "{url}");

    let path = url.trim_start_matches(BASE_URL);
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"not really a png");
}

#[tokio::test]
async fn voice_upload_is_webm() {
    let app = test_app().await.signed_in().await;
    let (status, body) = app
        .upload("/api/v1/attachments/voice", b"\x1a\x45\xdf\xa3")
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let url = body["url"].as_str().unwrap();
    assert!(url.contains("/files/voice-"), "{url}");
    assert!(url.ends_with(".webm"), "{url}");
}

#[tokio::test]
async fn upload_requires_a_backend_session() {
    let app = test_app().await;
    app.post("/api/v1/auth/developer", json!({})).await;

    let (status, body) = app.upload("/api/v1/attachments/photo", b"data").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "not_authenticated");
}

#[tokio::test]
async fn unknown_attachment_kind_is_rejected() {
    let app = test_app().await.signed_in().await;
    let (status, _) = app.upload("/api/v1/attachments/video", b"data").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn notes_are_listed_newest_first() {
    let app = test_app().await.signed_in().await;

    for title in ["First", "Second", "Third"] {
        let (status, _) = app.post("/api/v1/notes", json!({ "title": title })).await;
        assert_eq!(status, StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (_, body) = app.get("/api/v1/notes").await;
    assert_eq!(titles(&body), vec!["Third", "Second", "First"]);
}

#[tokio::test]
async fn notes_of_another_account_are_out_of_reach() {
    let app = test_app().await;
    app.sign_up("alice@example.com").await;
    let (_, note) = app
        .post("/api/v1/notes", json!({ "title": "Alice only", "content": "mine" }))
        .await;
    let id = note["id"].as_str().unwrap().to_string();
    app.log_out().await;

    app.sign_up("bob@example.com").await;
    let (_, body) = app.get("/api/v1/notes").await;
    assert!(titles(&body).is_empty());

    let (status, _) = app
        .put(&format!("/api/v1/notes/{id}"), json!({ "title": "Bob was here" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .post(&format!("/api/v1/notes/{id}/unlock"), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&format!("/api/v1/notes/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    app.log_out().await;

    app.log_in("alice@example.com").await;
    let (_, body) = app.get("/api/v1/notes").await;
    assert_eq!(titles(&body), vec!["Alice only"]);
    assert_eq!(body["notes"][0]["content"], "mine");
}

#[tokio::test]
async fn logout_drops_the_cached_notes() {
    let app = test_app().await.signed_in().await;
    let (_, body) = app.get("/api/v1/notes").await;
    assert!(titles(&body).is_empty());

    // Written by another client while this one holds a cached listing.
    let session = app.backend.get_session().await.unwrap().unwrap();
    let form = NoteFormData {
        title: "From elsewhere".to_string(),
        ..Default::default()
    };
    app.backend.insert_note(&session.user.id, &form).await.unwrap();

    app.log_out().await;
    app.log_in("me@example.com").await;

    let (_, body) = app.get("/api/v1/notes").await;
    assert_eq!(titles(&body), vec!["From elsewhere"]);
}

#[tokio::test]
async fn account_password_must_have_eight_characters() {
    let app = test_app().await;
    let (status, body) = app
        .post(
            "/api/v1/auth/signup",
            json!({ "email": "me@example.com", "password": "äöüß" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["message"], "Password must be at least 8 characters");
}
