mod common;

use common::RecordingBackend;
use reqlog::{BodySchema, Filter, HeaderRedact, JsonSchemaRedact, LoggedClient, Scope};
use serde_json::json;
use tracing::Level;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn logged_client(backend: RecordingBackend, filters: Vec<Box<dyn Filter>>) -> LoggedClient<RecordingBackend> {
    LoggedClient::with_backend(reqwest::Client::new(), backend, "svc", filters)
}

#[tokio::test]
async fn successful_exchange_is_logged_at_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"id": 7, "token": "t-1"}"#.as_bytes(), "application/json"),
        )
        .mount(&server)
        .await;

    let backend = RecordingBackend::default();
    let client = logged_client(
        backend.clone(),
        vec![Box::new(JsonSchemaRedact::new(
            BodySchema::fields(["token"]),
            Scope::ResponseOnly,
        ))],
    );

    let request = reqwest::Client::new()
        .get(format!("{}/v1/users?page=2", server.uri()))
        .header("x-req-id", "r-9")
        .build()
        .unwrap();
    let response = client.execute(request).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.json::<serde_json::Value>().unwrap(),
        json!({"id": 7, "token": "t-1"})
    );

    let events = backend.events();
    assert_eq!(events.len(), 1);
    let (level, payload) = &events[0];
    assert_eq!(*level, Level::INFO);
    assert_eq!(payload["extra_tags"], json!(["svc", "requests_out"]));

    let request = &payload["request"];
    assert_eq!(request["method"], "GET");
    assert_eq!(request["path"], "/v1/users");
    assert_eq!(request["query"]["page"], "2");
    assert_eq!(request["header"]["X-Req-Id"], "r-9");
    assert!(request["time"].as_f64().unwrap() >= 0.0);

    let response = &payload["response"];
    assert_eq!(response["status_code"], 200);
    let body: serde_json::Value =
        serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["token"], "<filtered>");
    assert_eq!(body["id"], 7);
}

#[tokio::test]
async fn request_side_redaction_applies_before_emission() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let backend = RecordingBackend::default();
    let client = logged_client(
        backend.clone(),
        vec![
            Box::new(HeaderRedact::new(["Authorization"], Scope::RequestOnly)),
            Box::new(JsonSchemaRedact::new(
                BodySchema::fields(["password"]),
                Scope::RequestOnly,
            )),
        ],
    );

    let request = reqwest::Client::new()
        .post(format!("{}/v1/login", server.uri()))
        .header("authorization", "Bearer tok")
        .header("content-type", "application/json")
        .body(r#"{"password": "hunter2", "user": "ada"}"#)
        .build()
        .unwrap();
    client.execute(request).await.unwrap();

    let payload = &backend.events()[0].1;
    assert_eq!(payload["request"]["header"]["Authorization"], "<filtered>");
    let body: serde_json::Value =
        serde_json::from_str(payload["request"]["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["password"], "<filtered>");
    assert_eq!(body["user"], "ada");
    assert_eq!(payload["response"]["status_code"], 204);
}

#[tokio::test]
async fn non_loggable_content_type_is_gated_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(vec![0xff, 0xfe, 0x00], "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let backend = RecordingBackend::default();
    let client = logged_client(backend.clone(), Vec::new());

    let request = reqwest::Client::new()
        .get(format!("{}/blob", server.uri()))
        .build()
        .unwrap();
    let response = client.execute(request).await.unwrap();
    assert_eq!(response.bytes().as_ref(), [0xff, 0xfe, 0x00]);

    let payload = &backend.events()[0].1;
    assert_eq!(
        payload["response"]["body"],
        "<body not loggable Content-Type application/octet-stream>"
    );
}

#[tokio::test]
async fn transport_failure_is_logged_at_error_without_response_fields() {
    let backend = RecordingBackend::default();
    let client = logged_client(backend.clone(), Vec::new());

    // Nothing listens here; the connection is refused.
    let request = reqwest::Client::new()
        .get("http://127.0.0.1:9/unreachable")
        .build()
        .unwrap();
    let result = client.execute(request).await;
    assert!(result.is_err());

    let events = backend.events();
    assert_eq!(events.len(), 1);
    let (level, payload) = &events[0];
    assert_eq!(*level, Level::ERROR);
    assert_eq!(payload["request"]["method"], "GET");
    assert_eq!(payload["request"]["path"], "/unreachable");
    assert!(payload["response"]["status_code"].is_null());
    assert!(payload["response"]["body"].is_null());
}
