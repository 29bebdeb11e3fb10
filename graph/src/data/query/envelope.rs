//! The response sent when a request fails in a way that query execution
//! cannot report field by field: the schema could not be loaded, the
//! resolvers could not be set up, or something unexpected broke. Clients
//! always see the same generic entry; the actual cause is logged.

use slog::{error, Logger};

use super::error::QueryError;
use super::result::QueryResult;
use crate::log::LogCode;

pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred while processing your request.";

/// Existing clients match on this fixed location, so it is kept even
/// though it does not point at anything in the failed request.
pub const PLACEHOLDER_LOCATION: (usize, usize) = (2, 3);

/// Fixed path reported alongside [`PLACEHOLDER_LOCATION`].
pub const PLACEHOLDER_PATH: [&str; 1] = ["users"];

/// Build the error envelope for `failure`, logging its full cause chain.
pub fn error_envelope(logger: &Logger, failure: &anyhow::Error) -> QueryResult {
    error!(
        logger,
        "Failed to process request";
        "error" => format!("{:#}", failure),
        "code" => LogCode::GraphQlQueryFailure,
    );
    QueryResult::from(QueryError::Unrecovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use slog::o;

    #[test]
    fn envelope_hides_the_cause() {
        let logger = Logger::root(slog::Discard, o!());
        let failure = anyhow::anyhow!("Schema file not found: /etc/schema.graphql");

        let result = error_envelope(&logger, &failure);

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "errors": [{
                    "message": "An error occurred while processing your request.",
                    "locations": [{"line": 2, "column": 3}],
                    "path": ["users"],
                }]
            })
        );
    }
}
