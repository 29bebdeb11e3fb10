#[macro_use]
extern crate pretty_assertions;

use std::time::{Duration, Instant};

use graph::graphql_parser;
use graph::prelude::serde_json::{json, Value as JsonValue};
use graph::prelude::GraphQlRunner as _;
use graph::prelude::*;
use graph::prelude::tokio;
use quire_graphql::prelude::{
    execute_query, store_registry, ArgumentValues, EntityProducer, GraphQlRunner,
    Query as PreparedQuery, QueryExecutionOptions, ResolverRegistry, RootField, RunnerSettings,
};
use quire_store_memory::MemoryStore;

const SCHEMA: &str = include_str!("../../schema/schema.graphql");

fn settings() -> RunnerSettings {
    RunnerSettings {
        query_timeout: None,
        max_depth: 255,
        log_timing: false,
    }
}

fn runner_with(
    sdl: &str,
    store: MemoryStore,
    strict_references: bool,
    settings: RunnerSettings,
) -> Arc<GraphQlRunner> {
    let logger = Logger::root(slog::Discard, o!());
    let setup = Schema::parse(sdl).map_err(Error::from).and_then(|schema| {
        let registry = store_registry(&logger, Arc::new(store), &schema, strict_references)?;
        Ok((Arc::new(schema), Arc::new(registry)))
    });
    Arc::new(GraphQlRunner::new(&logger, setup, settings))
}

fn runner() -> Arc<GraphQlRunner> {
    runner_with(SCHEMA, MemoryStore::seeded(), false, settings())
}

fn query(text: &str) -> Query {
    query_with(text, None, None)
}

fn query_with(text: &str, variables: Option<JsonValue>, operation_name: Option<&str>) -> Query {
    let document = graphql_parser::parse_query(text).unwrap().into_static();
    let variables = variables.map(|vars| serde_json::from_value(vars).unwrap());
    Query::new(document, variables, operation_name.map(str::to_owned))
}

async fn run(runner: &Arc<GraphQlRunner>, query: Query) -> JsonValue {
    runner.cheap_clone().run_query(query).await.to_json()
}

/// The response exactly as it is written to the wire. Unlike `run`, this
/// keeps the order of response keys.
async fn run_text(runner: &Arc<GraphQlRunner>, query: Query) -> String {
    let result = runner.cheap_clone().run_query(query).await;
    serde_json::to_string(result.as_ref()).unwrap()
}

/// A store where user 1 refers to a post that does not exist and post 2
/// refers to an author that does not exist.
fn dangling_store() -> MemoryStore {
    MemoryStore::new(
        vec![User::new("1", "John Doe", "john@example.com", &["1", "9"])],
        vec![
            Post::new("1", "First Post", "first", "1"),
            Post::new("2", "Orphan", "nobody wrote this", "7"),
        ],
    )
    .unwrap()
}

#[tokio::test]
async fn single_user_name() {
    let result = run(&runner(), query("{ user(id: \"1\") { name } }")).await;
    assert_eq!(result, json!({"data": {"user": {"name": "John Doe"}}}));
}

#[tokio::test]
async fn response_keys_follow_request_order() {
    let result = run_text(
        &runner(),
        query("{ user(id: \"1\") { name name email name } post(id: \"1\") { title id } }"),
    )
    .await;
    assert_eq!(
        result,
        r#"{"data":{"user":{"name":"John Doe","email":"john@example.com"},"post":{"title":"First Post","id":"1"}}}"#
    );

    let result = run_text(
        &runner(),
        query("{ p: posts { author { email id } } u: users { id } }"),
    )
    .await;
    assert_eq!(
        result,
        concat!(
            r#"{"data":{"p":["#,
            r#"{"author":{"email":"john@example.com","id":"1"}},"#,
            r#"{"author":{"email":"john@example.com","id":"1"}},"#,
            r#"{"author":{"email":"jane@example.com","id":"2"}}"#,
            r#"],"u":[{"id":"1"},{"id":"2"}]}}"#
        )
    );
}

#[tokio::test]
async fn missing_user_is_null_without_errors() {
    let result = run(&runner(), query("{ user(id: \"999\") { name } }")).await;
    assert_eq!(result, json!({"data": {"user": null}}));
}

#[tokio::test]
async fn user_posts_come_in_stored_order() {
    let result = run(
        &runner(),
        query("{ john: user(id: \"1\") { posts { id title } } jane: user(id: \"2\") { posts { id } } }"),
    )
    .await;

    assert_eq!(
        result,
        json!({
            "data": {
                "john": {"posts": [
                    {"id": "1", "title": "First Post"},
                    {"id": "2", "title": "Second Post"},
                ]},
                "jane": {"posts": [{"id": "3"}]},
            }
        })
    );
}

#[tokio::test]
async fn every_post_author_matches_the_stored_author_id() {
    let runner = runner();
    for (post, author) in [("1", "1"), ("2", "1"), ("3", "2")] {
        let text = format!("{{ post(id: \"{}\") {{ author {{ id }} }} }}", post);
        let result = run(&runner, query(&text)).await;
        assert_eq!(result, json!({"data": {"post": {"author": {"id": author}}}}));
    }
}

#[tokio::test]
async fn list_fields_and_unrequested_fields() {
    let result = run(&runner(), query("{ users { id email } }")).await;
    assert_eq!(
        result,
        json!({
            "data": {"users": [
                {"id": "1", "email": "john@example.com"},
                {"id": "2", "email": "jane@example.com"},
            ]}
        })
    );
}

#[tokio::test]
async fn nested_relationship_chains() {
    let result = run(
        &runner(),
        query("{ user(id: \"2\") { posts { author { name posts { title author { email } } } } } }"),
    )
    .await;

    assert_eq!(
        result,
        json!({
            "data": {"user": {"posts": [{
                "author": {
                    "name": "Jane Smith",
                    "posts": [{"title": "Third Post", "author": {"email": "jane@example.com"}}],
                }
            }]}}
        })
    );
}

#[tokio::test]
async fn aliases_and_typename() {
    let result = run(
        &runner(),
        query("{ first: post(id: \"1\") { __typename heading: title } who: user(id: \"2\") { kind: __typename } }"),
    )
    .await;

    assert_eq!(
        result,
        json!({
            "data": {
                "first": {"__typename": "Post", "heading": "First Post"},
                "who": {"kind": "User"},
            }
        })
    );
}

#[tokio::test]
async fn fragments_are_merged_in_request_order() {
    let result = run_text(
        &runner(),
        query(
            "
            query {
                user(id: \"1\") {
                    ...Contact
                    ... on User { id }
                    ... { name }
                }
            }

            fragment Contact on User { email }
            ",
        ),
    )
    .await;

    assert_eq!(
        result,
        r#"{"data":{"user":{"email":"john@example.com","id":"1","name":"John Doe"}}}"#
    );
}

#[tokio::test]
async fn skip_and_include_use_variables() {
    let text = "
        query q($brief: Boolean!) {
            user(id: \"1\") {
                name
                email @skip(if: $brief)
                posts @include(if: $brief) { id }
            }
        }
    ";

    let brief = run(&runner(), query_with(text, Some(json!({"brief": true})), None)).await;
    assert_eq!(
        brief,
        json!({"data": {"user": {"name": "John Doe", "posts": [{"id": "1"}, {"id": "2"}]}}})
    );

    let full = run(&runner(), query_with(text, Some(json!({"brief": false})), None)).await;
    assert_eq!(
        full,
        json!({"data": {"user": {"name": "John Doe", "email": "john@example.com"}}})
    );
}

#[tokio::test]
async fn variables_and_defaults() {
    let text = "query post($id: ID = \"3\") { post(id: $id) { title } }";

    let given = run(&runner(), query_with(text, Some(json!({"id": "2"})), None)).await;
    assert_eq!(given, json!({"data": {"post": {"title": "Second Post"}}}));

    let default = run(&runner(), query(text)).await;
    assert_eq!(default, json!({"data": {"post": {"title": "Third Post"}}}));

    // Integers are accepted as IDs
    let int_id = run(&runner(), query_with(text, Some(json!({"id": 1})), None)).await;
    assert_eq!(int_id, json!({"data": {"post": {"title": "First Post"}}}));
}

#[tokio::test]
async fn missing_required_variable() {
    let result = run(
        &runner(),
        query("query user($id: ID!) { user(id: $id) { name } }"),
    )
    .await;

    assert_eq!(
        result["errors"][0]["message"],
        json!("No value provided for required variable `id`")
    );
    assert!(result.get("data").is_none());
}

#[tokio::test]
async fn operation_name_selects_the_operation() {
    let text = "
        query John { user(id: \"1\") { name } }
        query Jane { user(id: \"2\") { name } }
    ";

    let jane = run(&runner(), query_with(text, None, Some("Jane"))).await;
    assert_eq!(jane, json!({"data": {"user": {"name": "Jane Smith"}}}));

    let ambiguous = run(&runner(), query(text)).await;
    assert_eq!(
        ambiguous,
        json!({"errors": [{"message": "Operation name required"}]})
    );

    let unknown = run(&runner(), query_with(text, None, Some("Nobody"))).await;
    assert_eq!(
        unknown,
        json!({"errors": [{"message": "Operation name not found `Nobody`"}]})
    );
}

#[tokio::test]
async fn mutations_are_rejected() {
    let result = run(&runner(), query("mutation { users { id } }")).await;
    assert_eq!(
        result,
        json!({"errors": [{"message": "Not supported: Only queries are supported"}]})
    );
}

#[tokio::test]
async fn validation_errors_abort_execution() {
    let result = run(
        &runner(),
        query("{ user(id: \"1\") { foo posts name { first } } }"),
    )
    .await;

    let messages: Vec<_> = result["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|error| error["message"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Type \"User\" has no field \"foo\"",
            "Field \"posts\" of type \"[Post]\" must have a selection of subfields",
            "Field \"name\" must not have a selection since type \"String\" has no subfields",
        ]
    );
    assert!(result.get("data").is_none());
    assert!(result["errors"][0]["locations"][0]["line"].is_u64());
}

#[tokio::test]
async fn undefined_fragment() {
    let result = run(&runner(), query("{ users { ...Missing } }")).await;
    assert_eq!(
        result,
        json!({"errors": [{"message": "Fragment `Missing` is not defined"}]})
    );
}

#[tokio::test]
async fn query_depth_is_limited() {
    let runner = runner();
    let deep = "{ users { posts { author { name } } } }";

    let result = runner
        .cheap_clone()
        .run_query_with_max_depth(query(deep), Some(3))
        .await;
    assert_eq!(
        result.to_json(),
        json!({"errors": [{"message": "The query has a depth that exceeds the limit of 3"}]})
    );

    let result = runner
        .run_query_with_max_depth(query("{ users { name } }"), Some(3))
        .await;
    assert!(!result.has_errors());
}

#[tokio::test]
async fn parse_errors_are_reported_with_their_location() {
    let err = graphql_parser::parse_query::<String>("{ user(id: \"1\") { name }").unwrap_err();
    let result = QueryResult::from(QueryError::from(err)).to_json();

    assert!(result.get("data").is_none());
    assert!(result["errors"][0]["locations"][0]["column"].is_u64());
}

#[tokio::test]
async fn missing_schema_answers_with_the_envelope() {
    let logger = Logger::root(slog::Discard, o!());
    let runner = Arc::new(GraphQlRunner::new(
        &logger,
        Err(anyhow!("Schema file not found: schema/schema.graphql")),
        settings(),
    ));

    let result = run(&runner, query("{ user(id: \"1\") { name } }")).await;
    assert_eq!(
        result,
        json!({
            "errors": [{
                "message": "An error occurred while processing your request.",
                "locations": [{"line": 2, "column": 3}],
                "path": ["users"],
            }]
        })
    );
}

#[tokio::test]
async fn malformed_schema_answers_with_the_envelope() {
    for sdl in [
        "type Query { users: [User] ",
        // Parses, but the store resolvers need a `Post` type
        "type User { id: ID! } type Query { users: [User] user(id: ID!): User }",
    ] {
        let runner = runner_with(sdl, MemoryStore::seeded(), false, settings());
        let result = run(&runner, query("{ users { id } }")).await;

        assert!(result.get("data").is_none());
        assert_eq!(
            result["errors"][0]["message"],
            json!("An error occurred while processing your request.")
        );
    }
}

#[tokio::test]
async fn dangling_references_are_null_by_default() {
    let runner = runner_with(SCHEMA, dangling_store(), false, settings());
    let result = run(
        &runner,
        query("{ user(id: \"1\") { posts { id } } post(id: \"2\") { title author { name } } }"),
    )
    .await;

    assert_eq!(
        result,
        json!({
            "data": {
                "user": {"posts": [{"id": "1"}, null]},
                "post": {"title": "Orphan", "author": null},
            }
        })
    );
}

#[tokio::test]
async fn strict_references_report_field_errors() {
    let runner = runner_with(SCHEMA, dangling_store(), true, settings());
    let result = run(
        &runner,
        query("{ user(id: \"1\") { name posts { id } } post(id: \"2\") { title author { name } } }"),
    )
    .await;

    // Only the missing post is nulled, the rest of the list resolves
    assert_eq!(
        result["data"],
        json!({
            "user": {"name": "John Doe", "posts": [{"id": "1"}, null]},
            "post": {"title": "Orphan", "author": null},
        })
    );
    assert_eq!(result["errors"][0]["message"], json!("Reference to missing Post \"9\""));
    assert_eq!(result["errors"][0]["path"], json!(["user", "posts", 1]));
    assert_eq!(result["errors"][1]["message"], json!("Reference to missing User \"7\""));
    assert_eq!(result["errors"][1]["path"], json!(["post", "author"]));
}

#[tokio::test]
async fn non_null_failures_null_the_nearest_nullable_parent() {
    let sdl = "
        type User { id: ID! name: String email: String posts: [Post] }
        type Post { id: ID! title: String content: String author: User! }
        type Query { users: [User] user(id: ID!): User posts: [Post] post(id: ID!): Post }
    ";
    let runner = runner_with(sdl, dangling_store(), true, settings());
    let result = run(&runner, query("{ posts { id author { name } } }")).await;

    // The failing author is non-null, so the post it belongs to is nulled
    assert_eq!(
        result,
        json!({
            "data": {"posts": [{"id": "1", "author": {"name": "John Doe"}}, null]},
            "errors": [{
                "message": "Reference to missing User \"7\"",
                "locations": [{"line": 1, "column": 14}],
                "path": ["posts", 1, "author"],
            }]
        })
    );
}

#[tokio::test]
async fn non_null_root_failure_nulls_data() {
    let sdl = "
        type User { id: ID! name: String email: String posts: [Post] }
        type Post { id: ID! title: String content: String author: User }
        type Query { users: [User] user(id: ID!): User! posts: [Post] post(id: ID!): Post }
    ";
    let runner = runner_with(sdl, MemoryStore::seeded(), false, settings());
    let result = run(&runner, query("{ user(id: \"999\") { name } }")).await;

    assert_eq!(result["data"], JsonValue::Null);
    assert_eq!(
        result["errors"][0]["message"],
        json!("Null value resolved for non-null field `user`")
    );
    assert_eq!(result["errors"][0]["path"], json!(["user"]));
}

#[tokio::test]
async fn concurrent_queries_for_disjoint_ids() {
    let runner = runner();

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let runner = runner.cheap_clone();
            let (id, name) = if i % 2 == 0 {
                ("1", "John Doe")
            } else {
                ("2", "Jane Smith")
            };
            tokio::spawn(async move {
                let text = format!("{{ user(id: \"{}\") {{ id name }} }}", id);
                let result = runner.run_query(query(&text)).await.to_json();
                (result, id, name)
            })
        })
        .collect();

    for handle in handles {
        let (result, id, name) = handle.await.unwrap();
        assert_eq!(result, json!({"data": {"user": {"id": id, "name": name}}}));
    }
}

struct Slow;

#[async_trait]
impl EntityProducer for Slow {
    async fn produce(
        &self,
        _: &r::Value,
        _: &ArgumentValues,
    ) -> Result<r::Value, QueryExecutionError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(r::Value::from("done"))
    }
}

#[tokio::test]
async fn deadline_stops_execution() {
    let logger = Logger::root(slog::Discard, o!());
    let schema = Arc::new(Schema::parse("type Query { slow: String fast: String }").unwrap());
    let registry = ResolverRegistry::builder()
        .with_root_field("slow", RootField::Entity(Arc::new(Slow)))
        .build(&schema)
        .unwrap();

    let prepared = PreparedQuery::new(&logger, schema, query("{ slow fast }"), 255).unwrap();
    let result = execute_query(
        prepared,
        QueryExecutionOptions {
            resolver: Arc::new(registry),
            deadline: Some(Instant::now() + Duration::from_millis(5)),
            log_timing: false,
        },
    )
    .await;

    assert_eq!(
        result.to_json(),
        json!({"errors": [{"message": "Query timed out"}]})
    );
}

#[tokio::test]
async fn unregistered_root_fields_are_null() {
    let logger = Logger::root(slog::Discard, o!());
    let schema = Arc::new(Schema::parse("type Query { slow: String fast: String }").unwrap());
    let registry = ResolverRegistry::builder()
        .with_root_field("slow", RootField::Entity(Arc::new(Slow)))
        .build(&schema)
        .unwrap();

    let prepared = PreparedQuery::new(&logger, schema, query("{ fast slow }"), 255).unwrap();
    let result = execute_query(
        prepared,
        QueryExecutionOptions {
            resolver: Arc::new(registry),
            deadline: None,
            log_timing: true,
        },
    )
    .await;

    assert_eq!(
        result.to_json(),
        json!({"data": {"fast": null, "slow": "done"}})
    );
}
