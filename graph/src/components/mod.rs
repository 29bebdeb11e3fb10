//! Quire is internally structured as a few layers of components, each with a
//! trait defining its interface.
//!
//! At the top the GraphQL server interacts with clients and hands queries to
//! a [`GraphQlRunner`](graphql::GraphQlRunner); at the bottom a
//! [`DatasetStore`](store::DatasetStore) answers lookups against the data.
//!
//! A request/response interaction between C1 and C2 is made by C1 requiring an
//! `Arc<C2>` in its constructor and then calling the functions defined on C2.

/// Components dealing with processing GraphQL.
pub mod graphql;

/// Components powering the GraphQL HTTP API.
pub mod server;

/// Components dealing with reading the dataset.
pub mod store;
