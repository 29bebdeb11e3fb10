use graph::components::server::server::{start, ServerHandle};
use graph::prelude::*;

use crate::service::GraphQLService;

/// A GraphQL server based on Hyper.
pub struct GraphQLServer<Q> {
    logger: Logger,
    graphql_runner: Arc<Q>,
}

impl<Q> GraphQLServer<Q>
where
    Q: GraphQlRunner,
{
    /// Creates a new GraphQL server.
    pub fn new(logger: &Logger, graphql_runner: Arc<Q>) -> Self {
        GraphQLServer {
            logger: logger.new(o!("component" => "GraphQLServer")),
            graphql_runner,
        }
    }

    /// Start serving on `port`. The server runs until the returned handle's
    /// task is dropped or aborted.
    pub async fn start(&self, port: u16) -> Result<ServerHandle, anyhow::Error> {
        let service = GraphQLService::new(
            self.logger.cheap_clone(),
            self.graphql_runner.cheap_clone(),
        );

        start(self.logger.cheap_clone(), port, move |req| {
            let service = service.cheap_clone();
            async move { service.call(req).await }
        })
        .await
    }
}
