use std::sync::Arc;
use std::time::Instant;

use crate::prelude::{QueryExecutionOptions, ResolverRegistry};
use crate::query::execute_query;
use graph::env::EnvVars;
use graph::prelude::{
    async_trait, o, Error, GraphQlRunner as GraphQlRunnerTrait, Logger, Query, QueryResult,
    Schema,
};

/// Query execution limits, usually taken from [`EnvVars`].
#[derive(Clone, Debug)]
pub struct RunnerSettings {
    pub query_timeout: Option<std::time::Duration>,
    pub max_depth: u8,
    pub log_timing: bool,
}

impl From<&EnvVars> for RunnerSettings {
    fn from(env_vars: &EnvVars) -> Self {
        RunnerSettings {
            query_timeout: env_vars.graphql_query_timeout(),
            max_depth: env_vars.graphql_max_depth(),
            log_timing: env_vars.log_gql_timing(),
        }
    }
}

/// GraphQL runner implementation for Quire.
///
/// The schema and registry are built once at startup. If either could not
/// be built, the runner still answers every query, with the error envelope.
pub struct GraphQlRunner {
    logger: Logger,
    setup: Result<(Arc<Schema>, Arc<ResolverRegistry>), Arc<Error>>,
    settings: RunnerSettings,
}

impl GraphQlRunner {
    /// Creates a new query runner.
    pub fn new(
        logger: &Logger,
        setup: Result<(Arc<Schema>, Arc<ResolverRegistry>), Error>,
        settings: RunnerSettings,
    ) -> Self {
        let logger = logger.new(o!("component" => "GraphQlRunner"));
        GraphQlRunner {
            logger,
            setup: setup.map_err(Arc::new),
            settings,
        }
    }

    async fn execute(&self, query: Query, max_depth: Option<u8>) -> Result<QueryResult, QueryResult> {
        let (schema, registry) = match &self.setup {
            Ok(setup) => setup,
            Err(e) => return Err(QueryResult::from_failure(&self.logger, e)),
        };

        let max_depth = max_depth.unwrap_or(self.settings.max_depth);
        let query = crate::execution::Query::new(&self.logger, schema.clone(), query, max_depth)?;

        Ok(execute_query(
            query,
            QueryExecutionOptions {
                resolver: registry.clone(),
                deadline: self.settings.query_timeout.map(|t| Instant::now() + t),
                log_timing: self.settings.log_timing,
            },
        )
        .await)
    }
}

#[async_trait]
impl GraphQlRunnerTrait for GraphQlRunner {
    async fn run_query(self: Arc<Self>, query: Query) -> Arc<QueryResult> {
        self.run_query_with_max_depth(query, None).await
    }

    async fn run_query_with_max_depth(
        self: Arc<Self>,
        query: Query,
        max_depth: Option<u8>,
    ) -> Arc<QueryResult> {
        let result = self
            .execute(query, max_depth)
            .await
            .unwrap_or_else(|e| e);
        Arc::new(result)
    }
}
