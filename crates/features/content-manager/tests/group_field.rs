mod common;

use axum::http::{Method, StatusCode};
use common::{app, delete, get, issue_paths, post, put, send_multipart};
use serde_json::{Value, json};

const URI: &str = "/content-manager/explorer/withgroup";

fn entry_uri(entry: &Value) -> String {
    format!("{URI}/{}", entry["id"])
}

#[tokio::test]
async fn creates_with_a_nested_record() {
    let app = app();
    let (status, entry) = post(&app, URI, json!({ "field": { "name": "someString" } })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["field"]["name"], "someString");
    assert!(entry["field"]["id"].as_u64().is_some());
    assert!(entry["created_at"].is_string());
    assert!(entry["updated_at"].is_string());
}

#[tokio::test]
async fn accepts_multipart_documents() {
    let app = app();
    let (status, entry) =
        send_multipart(&app, Method::POST, URI, &json!({ "field": { "name": "someString" } })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["field"]["name"], "someString");
}

#[tokio::test]
async fn multipart_without_data_part_is_a_bad_request() {
    let app = app();
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\n{{}}\r\n--{b}--\r\n",
        b = common::BOUNDARY
    );
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri(URI)
        .header("content-type", format!("multipart/form-data; boundary={}", common::BOUNDARY))
        .body(axum::body::Body::from(body))
        .unwrap();

    let (status, body) = common::respond(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
}

#[tokio::test]
async fn null_and_omitted_fields_read_back_as_null() {
    let app = app();

    let (status, entry) = post(&app, URI, json!({ "field": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["field"], Value::Null);

    let (status, entry) = post(&app, URI, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["field"], Value::Null);
}

#[tokio::test]
async fn rejects_invalid_values_on_create() {
    let app = app();

    for value in [json!([]), json!("someString"), json!(123), json!(true), json!(false)] {
        let (status, body) = post(&app, URI, json!({ "field": value })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "value {value}");
        assert_eq!(issue_paths(&body), ["field"]);
    }

    let (_, count) = get(&app, &format!("{URI}/count")).await;
    assert_eq!(count, json!({ "count": 0 }));
}

#[tokio::test]
async fn rejects_invalid_values_on_update_and_keeps_the_entry() {
    let app = app();
    let (_, entry) = post(&app, URI, json!({ "field": { "name": "someString" } })).await;

    for value in [json!([]), json!("someString"), json!(123), json!(true)] {
        let (status, _) = put(&app, &entry_uri(&entry), json!({ "field": value })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "value {value}");
    }

    let (_, stored) = get(&app, &entry_uri(&entry)).await;
    assert_eq!(stored["field"], entry["field"]);
}

#[tokio::test]
async fn omitted_field_is_kept_on_update() {
    let app = app();
    let (_, entry) = post(&app, URI, json!({ "field": { "name": "someString" } })).await;

    let (status, updated) = put(&app, &entry_uri(&entry), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["field"], entry["field"]);
}

#[tokio::test]
async fn update_without_id_replaces_the_record() {
    let app = app();
    let (_, entry) = post(&app, URI, json!({ "field": { "name": "someString" } })).await;

    let (status, updated) = put(&app, &entry_uri(&entry), json!({ "field": { "name": "otherString" } })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["field"]["name"], "otherString");
    assert_ne!(updated["field"]["id"], entry["field"]["id"]);
}

#[tokio::test]
async fn update_with_id_mutates_in_place() {
    let app = app();
    let (_, entry) = post(&app, URI, json!({ "field": { "name": "someString" } })).await;
    let nested_id = entry["field"]["id"].clone();

    let (status, updated) =
        put(&app, &entry_uri(&entry), json!({ "field": { "id": nested_id, "name": "otherString" } })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["field"], json!({ "id": nested_id, "name": "otherString" }));
}

#[tokio::test]
async fn null_clears_the_record() {
    let app = app();
    let (_, entry) = post(&app, URI, json!({ "field": { "name": "someString" } })).await;

    let (status, updated) = put(&app, &entry_uri(&entry), json!({ "field": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["field"], Value::Null);

    let (_, stored) = get(&app, &entry_uri(&entry)).await;
    assert_eq!(stored["field"], Value::Null);
}

#[tokio::test]
async fn unknown_nested_id_is_rejected() {
    let app = app();
    let (_, entry) = post(&app, URI, json!({ "field": { "name": "someString" } })).await;

    let (status, body) =
        put(&app, &entry_uri(&entry), json!({ "field": { "id": "invalid_id", "name": "otherString" } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(issue_paths(&body), ["field.id"]);

    let (status, body) = put(&app, &entry_uri(&entry), json!({ "field": { "id": 999, "name": "otherString" } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(issue_paths(&body), ["field.id"]);

    let (_, stored) = get(&app, &entry_uri(&entry)).await;
    assert_eq!(stored["field"]["name"], "someString");
}

#[tokio::test]
async fn nested_records_of_other_entries_cannot_be_claimed() {
    let app = app();
    let (_, first) = post(&app, URI, json!({ "field": { "name": "first" } })).await;
    let (_, second) = post(&app, URI, json!({ "field": { "name": "second" } })).await;

    let (status, _) =
        put(&app, &entry_uri(&second), json!({ "field": { "id": first["field"]["id"], "name": "stolen" } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stored) = get(&app, &entry_uri(&first)).await;
    assert_eq!(stored["field"]["name"], "first");
}

#[tokio::test]
async fn delete_removes_the_entry_and_its_record() {
    let app = app();
    let (_, entry) = post(&app, URI, json!({ "field": { "name": "someString" } })).await;

    let (status, deleted) = delete(&app, &entry_uri(&entry)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["field"], entry["field"]);

    let (status, body) = get(&app, &entry_uri(&entry)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "entry.notFound");

    let (status, _) = delete(&app, &entry_uri(&entry)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repeatable_groups_respect_bounds_and_required_fields() {
    let app = app();
    let uri = "/content-manager/explorer/withaddresses";

    let (status, body) = post(&app, uri, json!({ "addresses": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(issue_paths(&body), ["addresses"]);

    let (status, body) = post(&app, uri, json!({ "addresses": [{ "zip": 1000 }, { "city": "Kyiv", "zip": "x" }] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(issue_paths(&body), ["addresses[0].city", "addresses[1].zip"]);

    let (status, entry) =
        post(&app, uri, json!({ "addresses": [{ "city": "Kyiv" }, { "city": "Lviv", "zip": 79000 }] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["addresses"][0]["zip"], Value::Null);
    assert_eq!(entry["addresses"][1]["city"], "Lviv");

    let first = entry["addresses"][0]["id"].clone();
    let (status, updated) = put(
        &app,
        &format!("{uri}/{}", entry["id"]),
        json!({ "addresses": [{ "id": first, "zip": 1000 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["addresses"], json!([{ "id": first, "city": "Kyiv", "zip": 1000 }]));
}
