use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use serde::ser::*;
use thiserror::Error;

use crate::data::query::QueryError;

pub type ServerResponse = Response<Full<Bytes>>;
pub type ServerResult = Result<ServerResponse, GraphQLServerError>;

/// Errors that can occur while processing incoming requests.
#[derive(Debug, Error)]
pub enum GraphQLServerError {
    #[error("{0}")]
    ClientError(String),
    #[error("{0}")]
    QueryError(QueryError),
    #[error("{0}")]
    InternalError(String),
}

impl From<QueryError> for GraphQLServerError {
    fn from(e: QueryError) -> Self {
        GraphQLServerError::QueryError(e)
    }
}

impl From<&'static str> for GraphQLServerError {
    fn from(s: &'static str) -> Self {
        GraphQLServerError::InternalError(String::from(s))
    }
}

impl From<String> for GraphQLServerError {
    fn from(s: String) -> Self {
        GraphQLServerError::InternalError(s)
    }
}

impl Serialize for GraphQLServerError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if let GraphQLServerError::QueryError(e) = self {
            serializer.serialize_some(e)
        } else {
            let mut map = serializer.serialize_map(Some(1))?;
            let msg = format!("{}", self);
            map.serialize_entry("message", msg.as_str())?;
            map.end()
        }
    }
}
