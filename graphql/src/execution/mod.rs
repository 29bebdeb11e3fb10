/// Implementation of the GraphQL execution algorithm.
mod execution;

/// Common trait for field resolvers used in the execution.
mod resolver;

mod query;

pub use self::execution::*;
pub use self::query::Query;
pub use self::resolver::{default_field_value, ArgumentValues, FieldInfo, Resolved, Resolver};
