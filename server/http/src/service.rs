use graph::http::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use graph::http_body_util::{BodyExt, Full};
use graph::hyper::body::{Body, Bytes};
use graph::hyper::{Method, Request, Response, StatusCode};
use graph::prelude::*;

use crate::request::parse_graphql_request;

/// Serves GraphQL queries sent to `POST /graphql`.
pub struct GraphQLService<Q> {
    logger: Logger,
    graphql_runner: Arc<Q>,
}

impl<Q> Clone for GraphQLService<Q> {
    fn clone(&self) -> Self {
        Self {
            logger: self.logger.clone(),
            graphql_runner: self.graphql_runner.clone(),
        }
    }
}

impl<Q> CheapClone for GraphQLService<Q> {}

impl<Q> GraphQLService<Q>
where
    Q: GraphQlRunner,
{
    /// Creates a new GraphQL service.
    pub fn new(logger: Logger, graphql_runner: Arc<Q>) -> Self {
        GraphQLService {
            logger,
            graphql_runner,
        }
    }

    async fn handle_graphql_query<B>(self, request: Request<B>) -> ServerResult
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        let body = request
            .into_body()
            .collect()
            .await
            .map_err(|e| {
                GraphQLServerError::InternalError(format!("Failed to read request body: {}", e))
            })?
            .to_bytes();

        let query = parse_graphql_request(&body)?;
        let result = self.graphql_runner.cheap_clone().run_query(query).await;
        Ok(query_result_response(StatusCode::OK, result.as_ref()))
    }

    fn handle_method_not_allowed(&self) -> ServerResult {
        let mut response = error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("POST"));
        Ok(response)
    }

    /// Handles 404s.
    fn handle_not_found(&self) -> ServerResult {
        Ok(error_response(StatusCode::NOT_FOUND, "Not found"))
    }

    /// Turn a failed request into the response the client sees. Internal
    /// errors are logged and answered with the generic error envelope.
    fn handle_error(&self, error: GraphQLServerError) -> ServerResponse {
        match error {
            GraphQLServerError::ClientError(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
            GraphQLServerError::QueryError(e) => {
                query_result_response(StatusCode::OK, &QueryResult::from(e))
            }
            GraphQLServerError::InternalError(msg) => {
                let failure = anyhow!(msg);
                let result = QueryResult::from_failure(&self.logger, &failure);
                query_result_response(StatusCode::INTERNAL_SERVER_ERROR, &result)
            }
        }
    }

    /// Route a request. Every outcome, including failures, is answered
    /// with a response.
    pub async fn call<B>(self, req: Request<B>) -> ServerResult
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        let result = match (method, path.as_str()) {
            (Method::POST, "/graphql") => self.cheap_clone().handle_graphql_query(req).await,
            (_, "/graphql") => self.handle_method_not_allowed(),
            _ => self.handle_not_found(),
        };

        Ok(result.unwrap_or_else(|e| self.handle_error(e)))
    }
}

fn json_response(status: StatusCode, body: String) -> ServerResponse {
    let mut response = Response::new(Full::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Serialize `result` as it is, so response keys keep the order of the request.
fn query_result_response(status: StatusCode, result: &QueryResult) -> ServerResponse {
    match serde_json::to_string(result) {
        Ok(body) => json_response(status, body),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

/// A response carrying a single error message in the GraphQL error format.
fn error_response(status: StatusCode, message: &str) -> ServerResponse {
    let body = serde_json::json!({ "errors": [{ "message": message }] });
    json_response(status, body.to_string())
}

#[cfg(test)]
mod tests {
    use graph::http_body_util::{BodyExt, Full};
    use graph::hyper::body::Bytes;
    use graph::hyper::{Method, Request, StatusCode};
    use graph::prelude::serde_json::json;
    use graph::prelude::*;
    use graph::prelude::tokio;

    use super::GraphQLService;
    use crate::test_utils;

    /// A runner that answers every query with the same user.
    struct TestGraphQlRunner;

    #[async_trait]
    impl GraphQlRunner for TestGraphQlRunner {
        async fn run_query(self: Arc<Self>, query: Query) -> Arc<QueryResult> {
            self.run_query_with_max_depth(query, None).await
        }

        async fn run_query_with_max_depth(
            self: Arc<Self>,
            _query: Query,
            _max_depth: Option<u8>,
        ) -> Arc<QueryResult> {
            Arc::new(QueryResult::new(Some(object! {
                user: object! { name: "John Doe" }
            })))
        }
    }

    fn service() -> GraphQLService<TestGraphQlRunner> {
        let logger = Logger::root(slog::Discard, o!());
        GraphQLService::new(logger, Arc::new(TestGraphQlRunner))
    }

    fn request(method: Method, uri: &str, body: &'static str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn posted_queries_are_run() {
        let response = service()
            .call(request(
                Method::POST,
                "/graphql",
                "{\"query\": \"{ user { name } }\"}",
            ))
            .await
            .unwrap();

        let data = test_utils::assert_successful_response(response).await;
        assert_eq!(data.get("user"), Some(&json!({"name": "John Doe"})));
    }

    #[tokio::test]
    async fn other_methods_are_not_allowed() {
        let response = service()
            .call(request(Method::GET, "/graphql", ""))
            .await
            .unwrap();

        let errors =
            test_utils::assert_error_response(response, StatusCode::METHOD_NOT_ALLOWED, true)
                .await;
        assert_eq!(errors, vec![json!({"message": "Method not allowed"})]);
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let requests = [
            (Method::POST, "/"),
            (Method::GET, "/users"),
            (Method::POST, "/graphql/x"),
        ];
        for (method, uri) in requests {
            let response = service().call(request(method, uri, "")).await.unwrap();
            let errors =
                test_utils::assert_error_response(response, StatusCode::NOT_FOUND, true).await;
            assert_eq!(errors, vec![json!({"message": "Not found"})]);
        }
    }

    #[tokio::test]
    async fn malformed_bodies_are_client_errors() {
        let response = service()
            .call(request(Method::POST, "/graphql", "{\"variables\": {}}"))
            .await
            .unwrap();

        let errors = test_utils::assert_error_response(response, StatusCode::BAD_REQUEST, true).await;
        assert_eq!(
            errors,
            vec![json!({"message": "The \"query\" field is missing in request data"})]
        );
    }

    #[tokio::test]
    async fn unparseable_queries_are_answered_with_ok() {
        let response = service()
            .call(request(Method::POST, "/graphql", "{\"query\": \"{ user {\"}"))
            .await
            .unwrap();

        let errors = test_utils::assert_error_response(response, StatusCode::OK, true).await;
        assert!(errors[0]["locations"][0]["line"].is_u64());
    }

    #[tokio::test]
    async fn internal_errors_use_the_envelope() {
        let service = service();
        let response = service.handle_error(GraphQLServerError::InternalError(
            "lost the dataset".to_owned(),
        ));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            json!({
                "errors": [{
                    "message": "An error occurred while processing your request.",
                    "locations": [{"line": 2, "column": 3}],
                    "path": ["users"],
                }]
            })
        );
    }
}
