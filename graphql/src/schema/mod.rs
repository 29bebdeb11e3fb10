/// Utilities for working with GraphQL schema ASTs.
pub mod ast;
