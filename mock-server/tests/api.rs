use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Note};
use serde_json::Value;
use tower::ServiceExt;

const TOKEN: &str = "t0ken";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn authed(method: &str, uri: &str) -> http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("bearer {TOKEN}"))
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    authed(method, uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_token_yields_401_envelope_with_200_status() {
    let resp = app(TOKEN)
        .oneshot(Request::builder().uri("/notes").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["statusCode"], 401);
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let resp = app(TOKEN)
        .oneshot(
            Request::builder()
                .uri("/notes")
                .header(http::header::AUTHORIZATION, "bearer nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    let body: Value = body_json(resp).await;
    assert_eq!(body["statusCode"], 401);
}

// --- notes ---

#[tokio::test]
async fn list_notes_empty() {
    let resp = app(TOKEN)
        .oneshot(authed("GET", "/notes").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let notes: Vec<Note> = body_json(resp).await;
    assert!(notes.is_empty());
}

#[tokio::test]
async fn create_note_returns_201() {
    let resp = app(TOKEN)
        .oneshot(json_request("POST", "/notes", r#"{"title":"Buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let note: Note = body_json(resp).await;
    assert_eq!(note.title, "Buy milk");
    assert!(note.body.is_empty());
}

#[tokio::test]
async fn get_note_not_found_carries_envelope() {
    let resp = app(TOKEN)
        .oneshot(
            authed("GET", "/notes/00000000-0000-0000-0000-000000000000")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["message"], "note not found");
}

#[tokio::test]
async fn note_lifecycle() {
    use tower::Service;

    let mut app = app(TOKEN).into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/notes", r#"{"title":"Walk dog","body":"at 6"}"#))
        .await
        .unwrap();
    let created: Note = body_json(resp).await;
    let id = created.id;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", &format!("/notes/{id}"), r#"{"title":"Walk cat"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Note = body_json(resp).await;
    assert_eq!(updated.title, "Walk cat");
    assert_eq!(updated.body, "at 6");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("DELETE", &format!("/notes/{id}")).body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", &format!("/notes/{id}")).body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- misc routes ---

#[tokio::test]
async fn plain_is_not_json() {
    let resp = app(TOKEN)
        .oneshot(Request::builder().uri("/plain").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(&body_bytes(resp).await[..], b"not-json");
}

#[tokio::test]
async fn upload_reports_size_and_content_type() {
    let resp = app(TOKEN)
        .oneshot(
            authed("POST", "/uploads")
                .header(http::header::CONTENT_TYPE, "application/octet-stream")
                .body("12345".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    let body: Value = body_json(resp).await;
    assert_eq!(body["received"], 5);
    assert_eq!(body["contentType"], "application/octet-stream");
}

#[tokio::test]
async fn echo_reports_headers() {
    let resp = app(TOKEN)
        .oneshot(json_request("PUT", "/echo", r#"{"x":1}"#))
        .await
        .unwrap();

    let body: Value = body_json(resp).await;
    assert_eq!(body["method"], "PUT");
    assert_eq!(body["contentType"], "application/json");
    assert_eq!(body["authorization"], format!("bearer {TOKEN}"));
    assert_eq!(body["accept"], Value::Null);
    assert_eq!(body["body"], r#"{"x":1}"#);
}
