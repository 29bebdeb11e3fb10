use serde_derive::Serialize;
use slog::Logger;

use super::envelope;
use super::error::{QueryError, QueryExecutionError};
use crate::prelude::r;

/// The result of running a query. `data` is present whenever execution
/// started, even if it ended up `null`; `errors` is only serialized when
/// there are some.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<r::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<QueryError>,
}

impl QueryResult {
    pub fn new(data: Option<r::Value>) -> Self {
        QueryResult {
            data,
            errors: Vec::new(),
        }
    }

    /// A result for a request that failed without producing any data.
    /// Logs the cause and returns the generic error envelope.
    pub fn from_failure(logger: &Logger, failure: &anyhow::Error) -> Self {
        envelope::error_envelope(logger, failure)
    }

    pub fn with_errors(mut self, errors: Vec<QueryError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_data(&self) -> bool {
        self.data.as_ref().map_or(false, |data| !data.is_null())
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Serializing values and errors into a `serde_json::Value` cannot fail:
        // all map keys are strings
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<QueryExecutionError> for QueryResult {
    fn from(e: QueryExecutionError) -> Self {
        QueryResult::from(QueryError::from(e))
    }
}

impl From<QueryError> for QueryResult {
    fn from(e: QueryError) -> Self {
        QueryResult {
            data: None,
            errors: vec![e],
        }
    }
}

impl From<Vec<QueryExecutionError>> for QueryResult {
    fn from(e: Vec<QueryExecutionError>) -> Self {
        QueryResult {
            data: None,
            errors: e.into_iter().map(QueryError::from).collect(),
        }
    }
}

impl From<r::Object> for QueryResult {
    fn from(val: r::Object) -> Self {
        QueryResult::new(Some(r::Value::Object(val)))
    }
}

impl<V: Into<QueryResult>, E: Into<QueryResult>> From<Result<V, E>> for QueryResult {
    fn from(result: Result<V, E>) -> Self {
        match result {
            Ok(v) => v.into(),
            Err(e) => e.into(),
        }
    }
}
