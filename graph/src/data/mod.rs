/// Data types for dealing with GraphQL queries.
pub mod query;

/// Data types for dealing with the GraphQL type schema.
pub mod schema;

/// Data types for dealing with the users/posts dataset.
pub mod store;

/// Extensions and helpers for the `graphql_parser` ASTs.
pub mod graphql;

/// Values produced by query execution.
pub mod value;
