use graph::graphql_parser;
use graph::hyper::body::Bytes;
use graph::prelude::*;

/// Parse the body of a `POST /graphql` request into a query.
///
/// The body must be a JSON object with a string `query`; `variables` and
/// `operationName` are optional and may be `null`. A query text that does
/// not parse is a query error, which is answered like any other GraphQL
/// error; everything else wrong with the body is a client error.
pub fn parse_graphql_request(body: &Bytes) -> Result<Query, GraphQLServerError> {
    // Parse request body as JSON
    let json: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| GraphQLServerError::ClientError(format!("{}", e)))?;

    // Ensure the JSON data is an object
    let obj = json.as_object().ok_or_else(|| {
        GraphQLServerError::ClientError(String::from("Request data is not an object"))
    })?;

    // Ensure the JSON data has a "query" field
    let query_value = obj.get("query").ok_or_else(|| {
        GraphQLServerError::ClientError(String::from(
            "The \"query\" field is missing in request data",
        ))
    })?;

    // Ensure the "query" field is a string
    let query_string = query_value.as_str().ok_or_else(|| {
        GraphQLServerError::ClientError(String::from("The \"query\" field is not a string"))
    })?;

    // Parse the "query" field of the JSON body
    let document = graphql_parser::parse_query(query_string)
        .map_err(|e| GraphQLServerError::from(QueryError::from(e)))?
        .into_static();

    // Parse the "variables" field of the JSON body, if present
    let variables = match obj.get("variables") {
        None | Some(serde_json::Value::Null) => None,
        Some(variables @ serde_json::Value::Object(_)) => Some(
            serde_json::from_value(variables.clone())
                .map_err(|e| GraphQLServerError::ClientError(format!("{}", e)))?,
        ),
        _ => {
            return Err(GraphQLServerError::ClientError(String::from(
                "Invalid query variables provided",
            )))
        }
    };

    let operation_name = match obj.get("operationName") {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(name)) => Some(name.clone()),
        _ => {
            return Err(GraphQLServerError::ClientError(String::from(
                "The \"operationName\" field is not a string",
            )))
        }
    };

    Ok(Query::new(document, variables, operation_name))
}
