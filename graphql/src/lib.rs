/// Utilities for working with GraphQL schemas.
pub mod schema;

/// Utilities for executing GraphQL.
mod execution;

/// Utilities for executing GraphQL queries and working with query ASTs.
pub mod query;

/// Utilities for working with GraphQL values.
mod values;

/// Binding object types and root fields to resolvers.
pub mod registry;

/// Resolvers backed by a `DatasetStore`.
mod store;

/// The external interface for actually running queries
mod runner;

/// Prelude that exports the most important traits and types.
pub mod prelude {
    pub use super::execution::{
        default_field_value, ArgumentValues, ExecutionContext, FieldInfo, Query, Resolved,
        Resolver,
    };
    pub use super::query::{execute_query, QueryExecutionOptions};
    pub use super::registry::{
        EntityProducer, ListProducer, ObjectResolver, RegistryBuilder, RegistryError, Resolution,
        ResolverRegistry, RootField, TypeResolver,
    };
    pub use super::store::{store_registry, PostResolver, UserResolver};
    pub use super::values::MaybeCoercible;

    pub use super::runner::{GraphQlRunner, RunnerSettings};
}
