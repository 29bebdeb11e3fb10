use std::sync::atomic::Ordering;

use graph::http_body_util::{BodyExt, Full};
use graph::hyper::body::Bytes;
use graph::hyper::{Method, Request, Response, StatusCode};
use graph::hyper_util::client::legacy::Client;
use graph::hyper_util::rt::TokioExecutor;
use graph::prelude::serde_json::json;
use graph::prelude::*;
use graph::prelude::tokio;
use pretty_assertions::assert_eq;

use quire_graphql::prelude::{store_registry, GraphQlRunner as Runner, RunnerSettings};
use quire_server_http::test_utils;
use quire_server_http::{GraphQLServer, GraphQLService};
use quire_store_memory::MemoryStore;

const SCHEMA: &str = include_str!("../../../schema/schema.graphql");

fn settings() -> RunnerSettings {
    RunnerSettings {
        query_timeout: None,
        max_depth: 255,
        log_timing: false,
    }
}

fn runner(sdl: &str) -> Arc<Runner> {
    let logger = Logger::root(slog::Discard, o!());
    let store = Arc::new(MemoryStore::seeded());
    let setup = Schema::parse(sdl).map_err(Error::from).and_then(|schema| {
        let registry = store_registry(&logger, store, &schema, false)?;
        Ok((Arc::new(schema), Arc::new(registry)))
    });
    Arc::new(Runner::new(&logger, setup, settings()))
}

fn service(sdl: &str) -> GraphQLService<Runner> {
    GraphQLService::new(Logger::root(slog::Discard, o!()), runner(sdl))
}

fn post(body: &'static str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header("content-type", "application/json")
        .body(Full::from(body))
        .unwrap()
}

#[tokio::test]
async fn answers_queries() {
    let response = service(SCHEMA)
        .call(post(r#"{"query": "{ user(id: \"1\") { name } }"}"#))
        .await
        .unwrap();

    let data = test_utils::assert_successful_response(response).await;
    assert_eq!(data.get("user"), Some(&json!({"name": "John Doe"})));
}

#[tokio::test]
async fn passes_variables_and_operation_name() {
    let response = service(SCHEMA)
        .call(post(
            r#"{
                "query": "query A { users { id } } query B($id: ID!) { post(id: $id) { title author { name } } }",
                "variables": {"id": "3"},
                "operationName": "B"
            }"#,
        ))
        .await
        .unwrap();

    let data = test_utils::assert_successful_response(response).await;
    assert_eq!(
        data.get("post"),
        Some(&json!({"title": "Third Post", "author": {"name": "Jane Smith"}}))
    );
}

#[tokio::test]
async fn responses_keep_request_order() {
    let response = service(SCHEMA)
        .call(post(
            r#"{"query": "{ user(id: \"1\") { name email } post(id: \"2\") { title author { id } } }"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.collect().await.unwrap().to_bytes();
    assert_eq!(
        String::from_utf8(body.to_vec()).unwrap(),
        concat!(
            r#"{"data":{"user":{"name":"John Doe","email":"john@example.com"},"#,
            r#""post":{"title":"Second Post","author":{"id":"1"}}}}"#
        )
    );
}

#[tokio::test]
async fn rejects_empty_json() {
    let response = service(SCHEMA).call(post("{}")).await.unwrap();

    let errors = test_utils::assert_error_response(response, StatusCode::BAD_REQUEST, true).await;
    assert_eq!(
        errors[0]["message"],
        json!("The \"query\" field is missing in request data")
    );
}

#[tokio::test]
async fn rejects_invalid_queries() {
    let response = service(SCHEMA)
        .call(post(r#"{"query": "<L<G<>M>"}"#))
        .await
        .unwrap();

    let errors = test_utils::assert_error_response(response, StatusCode::OK, true).await;
    let message = errors[0]["message"]
        .as_str()
        .expect("Error message is not a string");
    assert!(message.contains("unexpected character '<'"));

    let location = &errors[0]["locations"][0];
    assert_eq!(location["line"], json!(1));
    assert_eq!(location["column"], json!(1));
}

#[tokio::test]
async fn malformed_schema_answers_with_the_envelope() {
    let response = service("type Query {")
        .call(post(r#"{"query": "{ users { id } }"}"#))
        .await
        .unwrap();

    let errors = test_utils::assert_error_response(response, StatusCode::OK, true).await;
    assert_eq!(
        errors,
        vec![json!({
            "message": "An error occurred while processing your request.",
            "locations": [{"line": 2, "column": 3}],
            "path": ["users"],
        })]
    );
}

#[tokio::test]
async fn serves_over_http() {
    let logger = Logger::root(slog::Discard, o!());
    let server = GraphQLServer::new(&logger, runner(SCHEMA));
    let handle = server.start(0).await.expect("Failed to start GraphQL server");

    let client = Client::builder(TokioExecutor::new()).build_http::<Full<Bytes>>();
    let uri = format!("http://127.0.0.1:{}/graphql", handle.local_addr.port());
    let request = Request::post(uri)
        .body(Full::from(r#"{"query": "{ posts { id } }"}"#))
        .unwrap();
    let response = client.request(request).await.unwrap();

    // Buffer the body so the shared assertions can read it
    let (parts, body) = response.into_parts();
    let body = body.collect().await.unwrap().to_bytes();
    let response = Response::from_parts(parts, Full::new(body));

    let data = test_utils::assert_successful_response(response).await;
    assert_eq!(
        data.get("posts"),
        Some(&json!([{"id": "1"}, {"id": "2"}, {"id": "3"}]))
    );

    assert!(handle.accepting.load(Ordering::SeqCst));
    handle.handle.abort();
}
