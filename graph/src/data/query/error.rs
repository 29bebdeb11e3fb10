use graphql_parser::Pos;
use serde::ser::*;
use thiserror::Error;

use super::envelope::{GENERIC_ERROR_MESSAGE, PLACEHOLDER_LOCATION, PLACEHOLDER_PATH};
use super::path::ResponsePath;
use crate::components::store::StoreError;
use crate::prelude::{q, r};

/// Error caused while executing a [Query](struct.Query.html).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryExecutionError {
    #[error("Operation name required")]
    OperationNameRequired,
    #[error("Operation name not found `{0}`")]
    OperationNotFound(String),
    #[error("Not supported: {0}")]
    NotSupported(String),
    #[error("Null value resolved for non-null field `{1}`")]
    NonNullError(Pos, String),
    #[error("Non-list value resolved for list field `{1}`")]
    ListValueError(Pos, String),
    #[error("Failed to resolve named type `{0}`")]
    NamedTypeError(String),
    #[error("Invalid value provided for argument `{1}`: {2}")]
    InvalidArgumentError(Pos, String, r::Value),
    #[error("No value provided for required argument: `{1}`")]
    MissingArgumentError(Pos, String),
    #[error("Variable `{1}` must have an input type")]
    InvalidVariableTypeError(Pos, String),
    #[error("No value provided for required variable `{1}`")]
    MissingVariableError(Pos, String),
    #[error("Invalid value provided for variable `{1}`: {2}")]
    InvalidVariableError(Pos, String, r::Value),
    #[error("Type \"{1}\" has no field \"{2}\"")]
    UnknownField(Pos, String, String),
    #[error("Field \"{1}\" of type \"{2}\" must have a selection of subfields")]
    MissingSelectionSet(Pos, String, String),
    #[error("Field \"{1}\" must not have a selection since type \"{2}\" has no subfields")]
    UnexpectedSelectionSet(Pos, String, String),
    #[error("Fragment `{0}` is not defined")]
    UndefinedFragment(String),
    #[error("Fragment `{0}` spreads itself")]
    CyclicalFragment(String),
    #[error("The query has a depth that exceeds the limit of {0}")]
    TooDeep(u8),
    #[error("The query is empty")]
    EmptyQuery,
    #[error("Reference to missing {1} \"{2}\"")]
    DanglingReference(Pos, String, String),
    #[error("Failed to read from the dataset: {0}")]
    StoreError(String),
    #[error("Query timed out")]
    Timeout,
}

impl QueryExecutionError {
    /// The position in the query text this error refers to, if any.
    pub fn position(&self) -> Option<Pos> {
        use QueryExecutionError::*;
        match self {
            NonNullError(pos, _)
            | ListValueError(pos, _)
            | InvalidArgumentError(pos, _, _)
            | MissingArgumentError(pos, _)
            | InvalidVariableTypeError(pos, _)
            | MissingVariableError(pos, _)
            | InvalidVariableError(pos, _, _)
            | UnknownField(pos, _, _)
            | MissingSelectionSet(pos, _, _)
            | UnexpectedSelectionSet(pos, _, _)
            | DanglingReference(pos, _, _) => Some(*pos),
            OperationNameRequired
            | OperationNotFound(_)
            | NotSupported(_)
            | NamedTypeError(_)
            | UndefinedFragment(_)
            | CyclicalFragment(_)
            | TooDeep(_)
            | EmptyQuery
            | StoreError(_)
            | Timeout => None,
        }
    }

    /// Internal failures are reported to clients with a generic message;
    /// their details only go to the log.
    pub fn is_internal(&self) -> bool {
        matches!(self, QueryExecutionError::StoreError(_))
    }
}

impl From<StoreError> for QueryExecutionError {
    fn from(e: StoreError) -> Self {
        QueryExecutionError::StoreError(e.to_string())
    }
}

impl From<QueryExecutionError> for Vec<QueryExecutionError> {
    fn from(e: QueryExecutionError) -> Self {
        vec![e]
    }
}

/// Error caused while processing a [Query](struct.Query.html) request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("{0}")]
    ParseError(String),
    #[error("{0}")]
    ExecutionError(QueryExecutionError),
    /// A failure while resolving a single field of the response.
    #[error("{error} (at {path})")]
    FieldError {
        error: QueryExecutionError,
        path: ResponsePath,
    },
    /// A failure nothing could recover from. The cause has been logged and is
    /// never sent to the client.
    #[error("{}", GENERIC_ERROR_MESSAGE)]
    Unrecovered,
}

impl From<q::ParseError> for QueryError {
    fn from(e: q::ParseError) -> Self {
        QueryError::ParseError(e.to_string())
    }
}

impl From<QueryExecutionError> for QueryError {
    fn from(e: QueryExecutionError) -> Self {
        QueryError::ExecutionError(e)
    }
}

/// Split a parser message like `query parse error: Parse error at 2:3\nUnexpected ..`
/// into the location it names and the remaining explanation.
fn split_parse_error(msg: &str) -> (Option<(usize, usize)>, String) {
    let inner = msg.replace("query parse error:", "");
    let inner = inner.trim();
    let mut parts = inner.splitn(2, '\n');
    let first = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).unwrap_or_default();

    let location = first.rsplit(' ').next().and_then(|loc| {
        let (line, column) = loc.split_once(':')?;
        Some((line.parse().ok()?, column.parse().ok()?))
    });

    match location {
        Some(location) if !rest.is_empty() => (Some(location), rest.replace('\n', " ")),
        Some(location) => (Some(location), inner.to_string()),
        None => (None, inner.to_string()),
    }
}

struct Location {
    line: usize,
    column: usize,
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("line", &self.line)?;
        map.serialize_entry("column", &self.column)?;
        map.end()
    }
}

impl From<Pos> for Location {
    fn from(pos: Pos) -> Self {
        Location {
            line: pos.line,
            column: pos.column,
        }
    }
}

fn execution_error_message(e: &QueryExecutionError) -> String {
    if e.is_internal() {
        GENERIC_ERROR_MESSAGE.to_string()
    } else {
        e.to_string()
    }
}

impl Serialize for QueryError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        match self {
            // Serialize parse errors with their location (line, column) to make it easier
            // for users to find where the errors are
            QueryError::ParseError(msg) => {
                let (location, msg) = split_parse_error(msg);
                map.serialize_entry("message", &msg)?;
                if let Some((line, column)) = location {
                    map.serialize_entry("locations", &vec![Location { line, column }])?;
                }
            }
            QueryError::ExecutionError(e) => {
                map.serialize_entry("message", &execution_error_message(e))?;
                if let Some(pos) = e.position() {
                    map.serialize_entry("locations", &vec![Location::from(pos)])?;
                }
            }
            QueryError::FieldError { error, path } => {
                map.serialize_entry("message", &execution_error_message(error))?;
                if let Some(pos) = error.position() {
                    map.serialize_entry("locations", &vec![Location::from(pos)])?;
                }
                map.serialize_entry("path", path)?;
            }
            QueryError::Unrecovered => {
                let (line, column) = PLACEHOLDER_LOCATION;
                map.serialize_entry("message", GENERIC_ERROR_MESSAGE)?;
                map.serialize_entry("locations", &vec![Location { line, column }])?;
                map.serialize_entry("path", &PLACEHOLDER_PATH)?;
            }
        }

        map.end()
    }
}
