use std::path::Path;

use graph::env::EnvVars;
use graph::log::LogCode;
use graph::prelude::*;
use quire_graphql::prelude::{store_registry, GraphQlRunner, ResolverRegistry, RunnerSettings};
use quire_server_http::GraphQLServer;
use quire_store_memory::MemoryStore;

use crate::opt::Opt;

/// Load the dataset from `path`, or use the built-in sample dataset.
/// References that don't resolve are logged but don't stop the node.
pub fn load_dataset(logger: &Logger, path: Option<&Path>) -> Result<MemoryStore, Error> {
    let store = match path {
        Some(path) => MemoryStore::from_file(path).map_err(|e| {
            error!(logger, "Failed to load dataset";
                   "path" => path.display().to_string(),
                   "error" => e.to_string(),
                   "code" => LogCode::DatasetLoadFailure);
            e
        })?,
        None => MemoryStore::seeded(),
    };

    for violation in store.validate() {
        warn!(logger, "Dataset reference does not resolve";
              "violation" => violation.to_string(),
              "code" => LogCode::DanglingReference);
    }
    info!(logger, "Dataset loaded";
          "users" => store.user_count(),
          "posts" => store.post_count());

    Ok(store)
}

/// Load the schema at `path` and bind the store's resolvers to it.
pub fn load_schema(
    logger: &Logger,
    path: &Path,
    store: Arc<dyn DatasetStore>,
    strict_references: bool,
) -> Result<(Arc<Schema>, Arc<ResolverRegistry>), Error> {
    let schema = Schema::load(path)?;
    let registry = store_registry(logger, store, &schema, strict_references)
        .with_context(|| format!("schema {} cannot be served", path.display()))?;
    Ok((Arc::new(schema), Arc::new(registry)))
}

/// Build the query runner. A schema that can't be loaded does not stop the
/// node: the failure is logged and every query is answered with the error
/// envelope.
pub fn graphql_runner(
    logger: &Logger,
    schema_path: &Path,
    store: Arc<dyn DatasetStore>,
    env_vars: &EnvVars,
) -> Arc<GraphQlRunner> {
    let setup = load_schema(logger, schema_path, store, env_vars.strict_references());
    match &setup {
        Ok((schema, _)) => info!(logger, "Schema loaded";
                                 "path" => schema_path.display().to_string(),
                                 "types" => schema.object_types().len()),
        Err(e) => error!(logger, "Failed to load schema";
                         "path" => schema_path.display().to_string(),
                         "error" => format!("{:#}", e),
                         "code" => LogCode::SchemaLoadFailure),
    }
    Arc::new(GraphQlRunner::new(
        logger,
        setup,
        RunnerSettings::from(env_vars),
    ))
}

pub async fn run(logger: Logger, opt: Opt, env_vars: Arc<EnvVars>) -> Result<(), Error> {
    info!(logger, "Quire version: {}", env!("CARGO_PKG_VERSION"));
    info!(logger, "Starting up");

    let store = load_dataset(&logger, opt.dataset.as_deref())?;
    let graphql_runner = graphql_runner(&logger, &opt.schema, Arc::new(store), &env_vars);

    let server = GraphQLServer::new(&logger, graphql_runner);
    let handle = server
        .start(opt.http_port)
        .await
        .context("failed to start the GraphQL server")?;

    handle.handle.await.context("GraphQL server stopped")
}
