use graph::prelude::*;
use std::time::Instant;

use crate::execution::*;
use crate::execution::Query;

/// Utilities for working with GraphQL query ASTs.
pub mod ast;

/// Options available for query execution.
pub struct QueryExecutionOptions<R>
where
    R: Resolver,
{
    /// The resolver to use.
    pub resolver: Arc<R>,

    /// Time at which the query times out.
    pub deadline: Option<Instant>,

    /// Whether to log how long the query took.
    pub log_timing: bool,
}

/// Executes a prepared query and returns a result.
///
/// A query that fails partway still produces `data`: failed fields are
/// `null` and each failure is listed in `errors`. A query that runs out of
/// time produces no data at all.
pub async fn execute_query<R>(query: Arc<Query>, options: QueryExecutionOptions<R>) -> QueryResult
where
    R: Resolver,
{
    let ctx = ExecutionContext::new(
        query.logger.cheap_clone(),
        query.cheap_clone(),
        options.resolver,
        options.deadline,
    );

    let result = execute_root_selection_set(&ctx).await;
    if options.log_timing {
        query.log_execution();
    }

    let errors = ctx.take_errors();
    match result {
        Ok(data) => QueryResult::new(Some(data)).with_errors(errors),
        Err(e) => QueryResult::from(e).with_errors(errors),
    }
}
