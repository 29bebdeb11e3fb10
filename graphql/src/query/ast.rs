use graph::prelude::q::*;
use graph::prelude::r;
use std::collections::HashMap;
use std::ops::Deref;

use graph::prelude::QueryExecutionError;

/// Returns the operation for the given name (or the only operation if no name is defined).
pub fn get_operation<'a>(
    document: &'a Document,
    name: Option<&str>,
) -> Result<&'a OperationDefinition, QueryExecutionError> {
    let operations = get_operations(document);

    match (name, operations.len()) {
        (_, 0) => Err(QueryExecutionError::EmptyQuery),
        (None, 1) => Ok(operations[0]),
        (None, _) => Err(QueryExecutionError::OperationNameRequired),
        (Some(s), _) => operations
            .into_iter()
            .find(|op| get_operation_name(op) == Some(s))
            .ok_or_else(|| QueryExecutionError::OperationNotFound(s.to_string())),
    }
}

/// Returns all operation definitions in the document.
pub fn get_operations(document: &Document) -> Vec<&OperationDefinition> {
    document
        .definitions
        .iter()
        .filter_map(|d| match d {
            Definition::Operation(op) => Some(op),
            _ => None,
        })
        .collect()
}

/// Returns the name of the given operation (if it has one).
pub fn get_operation_name(operation: &OperationDefinition) -> Option<&str> {
    match operation {
        OperationDefinition::Mutation(m) => m.name.as_ref().map(Deref::deref),
        OperationDefinition::Query(q) => q.name.as_ref().map(Deref::deref),
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Subscription(s) => s.name.as_ref().map(Deref::deref),
    }
}

/// Looks up a directive in a selection, if it is provided.
pub fn get_directive<'a>(selection: &'a Selection, name: &str) -> Option<&'a Directive> {
    let directives = match selection {
        Selection::Field(field) => &field.directives,
        Selection::FragmentSpread(spread) => &spread.directives,
        Selection::InlineFragment(fragment) => &fragment.directives,
    };
    directives.iter().find(|directive| directive.name == name)
}

/// Looks up the value of an argument in a vector of (name, value) tuples.
pub fn get_argument_value<'a>(arguments: &'a [(String, Value)], name: &str) -> Option<&'a Value> {
    arguments.iter().find(|(n, _)| n == name).map(|(_, v)| v)
}

/// The boolean `if` argument of a directive, with variables substituted.
/// `None` if the argument is missing or not a boolean.
fn directive_condition(directive: &Directive, variables: &HashMap<String, r::Value>) -> Option<bool> {
    match get_argument_value(&directive.arguments, "if")? {
        Value::Boolean(b) => Some(*b),
        Value::Variable(name) => match variables.get(name) {
            Some(r::Value::Boolean(b)) => Some(*b),
            _ => None,
        },
        _ => None,
    }
}

/// Returns true if a selection should be skipped (as per the `@skip` directive).
pub fn skip_selection(selection: &Selection, variables: &HashMap<String, r::Value>) -> bool {
    match get_directive(selection, "skip") {
        Some(directive) => directive_condition(directive, variables).unwrap_or(false),
        None => false,
    }
}

/// Returns true if a selection should be included (as per the `@include` directive).
pub fn include_selection(selection: &Selection, variables: &HashMap<String, r::Value>) -> bool {
    match get_directive(selection, "include") {
        Some(directive) => directive_condition(directive, variables).unwrap_or(false),
        None => true,
    }
}

/// Returns the response key of a field, which is either its name or its alias (if there is one).
pub fn get_response_key(field: &Field) -> &str {
    field
        .alias
        .as_ref()
        .map(Deref::deref)
        .unwrap_or(field.name.as_str())
}

/// Returns the variable definitions for an operation.
pub fn get_variable_definitions(
    operation: &OperationDefinition,
) -> Option<&Vec<VariableDefinition>> {
    match operation {
        OperationDefinition::Query(q) => Some(&q.variable_definitions),
        OperationDefinition::Subscription(s) => Some(&s.variable_definitions),
        OperationDefinition::Mutation(m) => Some(&m.variable_definitions),
        OperationDefinition::SelectionSet(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph::graphql_parser;

    fn document(text: &str) -> Document {
        graphql_parser::parse_query(text).unwrap().into_static()
    }

    fn first_selection(document: &Document) -> &Selection {
        match get_operation(document, None).unwrap() {
            OperationDefinition::SelectionSet(set) => &set.items[0],
            OperationDefinition::Query(query) => &query.selection_set.items[0],
            _ => unreachable!(),
        }
    }

    #[test]
    fn named_operations_are_found() {
        let doc = document("query A { users { id } } query B { posts { id } }");

        assert_eq!(
            get_operation(&doc, None).unwrap_err(),
            QueryExecutionError::OperationNameRequired
        );
        let op = get_operation(&doc, Some("B")).unwrap();
        assert_eq!(get_operation_name(op), Some("B"));
        assert_eq!(
            get_operation(&doc, Some("C")).unwrap_err(),
            QueryExecutionError::OperationNotFound("C".to_owned())
        );
    }

    #[test]
    fn directives_read_variables() {
        let doc = document("query Q($hide: Boolean) { users @skip(if: $hide) { id } }");
        let selection = first_selection(&doc);

        let mut variables = HashMap::new();
        assert!(!skip_selection(selection, &variables));
        variables.insert("hide".to_owned(), r::Value::Boolean(true));
        assert!(skip_selection(selection, &variables));
    }

    #[test]
    fn include_defaults_to_true() {
        let doc = document("{ users { id } }");
        assert!(include_selection(first_selection(&doc), &HashMap::new()));

        let doc = document("{ users @include(if: false) { id } }");
        assert!(!include_selection(first_selection(&doc), &HashMap::new()));
    }
}
