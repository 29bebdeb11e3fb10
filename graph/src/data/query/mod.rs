pub mod envelope;
mod error;
mod path;
mod query;
mod result;

pub use self::envelope::GENERIC_ERROR_MESSAGE;
pub use self::error::{QueryError, QueryExecutionError};
pub use self::path::{PathSegment, ResponsePath};
pub use self::query::{Query, QueryVariables};
pub use self::result::QueryResult;
