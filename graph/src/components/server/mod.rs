/// Component for running GraphQL queries over HTTP.
pub mod query;

pub mod server;
