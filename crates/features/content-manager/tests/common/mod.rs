#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use folio_domain::config::ApiConfig;
use folio_domain::schema::{Attribute, AttributeKind, ModelDefinition};
use folio_kernel::server::ApiState;
use serde_json::Value;
use tower::ServiceExt;

pub const BOUNDARY: &str = "folio-test-boundary";

/// Models used across the integration suites.
pub fn config() -> ApiConfig {
    let mut config = ApiConfig::default();
    let content = &mut config.content;

    content.groups = vec![
        ModelDefinition::new("somegroup").attribute("name", Attribute::new(AttributeKind::String)),
        ModelDefinition::new("address")
            .attribute("city", Attribute::new(AttributeKind::String).required())
            .attribute("zip", Attribute::new(AttributeKind::Integer)),
    ];
    content.content_types = vec![
        ModelDefinition::new("withgroup").attribute("field", Attribute::group("somegroup", false)),
        ModelDefinition::new("withaddresses").attribute(
            "addresses",
            Attribute { min: Some(1), max: Some(3), ..Attribute::group("address", true) },
        ),
        ModelDefinition::new("withboolean").attribute("field", Attribute::new(AttributeKind::Boolean)),
        ModelDefinition::new("withenumeration").attribute("field", Attribute::enumeration(["one", "two"])),
        ModelDefinition::new("withfloat").attribute("field", Attribute::new(AttributeKind::Float)),
        ModelDefinition::new("withrichtext").attribute("field", Attribute::new(AttributeKind::Richtext)),
        ModelDefinition::new("article")
            .attribute("title", Attribute::new(AttributeKind::String).required())
            .attribute("views", Attribute::new(AttributeKind::Integer))
            .attribute("notes", Attribute::new(AttributeKind::Json)),
    ];

    config
}

pub fn app() -> Router {
    let config = config();
    let slice = folio_content_manager::init(&config.content).expect("content manager initializes");
    let state = ApiState::builder().config(config).register_slice(slice).build().expect("state builds");

    let (router, _api) = folio_content_manager::router().split_for_parts();
    router.with_state(state)
}

/// Sends one request and decodes the JSON answer (`Value::Null` for an empty body).
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    respond(app, request).await
}

/// Sends `data` as the `data` part of a multipart form.
pub async fn send_multipart(app: &Router, method: Method, uri: &str, data: &Value) -> (StatusCode, Value) {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"data\"\r\n\r\n{data}\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap();

    respond(app, request).await
}

pub async fn respond(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };

    (status, body)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}

/// Paths of the validation issues in an error body.
pub fn issue_paths(body: &Value) -> Vec<String> {
    body["data"]["errors"]
        .as_array()
        .map(|errors| errors.iter().filter_map(|issue| issue["path"].as_str().map(str::to_owned)).collect())
        .unwrap_or_default()
}
