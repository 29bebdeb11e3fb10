use async_trait::async_trait;
use std::sync::Arc;

use crate::data::query::{Query, QueryResult};

/// A component that can run GraphQL queries against the dataset.
#[async_trait]
pub trait GraphQlRunner: Send + Sync + 'static {
    /// Runs a GraphQL query and returns its result.
    async fn run_query(self: Arc<Self>, query: Query) -> Arc<QueryResult>;

    /// Runs a GraphQL query with a depth limit that overrides the configured one.
    async fn run_query_with_max_depth(
        self: Arc<Self>,
        query: Query,
        max_depth: Option<u8>,
    ) -> Arc<QueryResult>;
}
