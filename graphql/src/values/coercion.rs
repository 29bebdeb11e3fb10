use graph::graphql_parser::Pos;
use graph::prelude::{q, r, s, QueryExecutionError};
use std::collections::HashMap;

use crate::schema::ast as sast;

/// A value that can be coerced according to a type.
pub trait MaybeCoercible<T: ?Sized> {
    fn coerce(self, using_type: &T) -> Option<r::Value>;
}

impl MaybeCoercible<s::EnumType> for r::Value {
    fn coerce(self, using_type: &s::EnumType) -> Option<r::Value> {
        match self {
            r::Value::Null => Some(r::Value::Null),
            r::Value::String(name) | r::Value::Enum(name)
                if using_type.values.iter().any(|value| value.name == name) =>
            {
                Some(r::Value::Enum(name))
            }
            _ => None,
        }
    }
}

impl MaybeCoercible<s::ScalarType> for r::Value {
    fn coerce(self, using_type: &s::ScalarType) -> Option<r::Value> {
        // Custom scalars have no representation we could check against
        if sast::is_builtin_scalar(&using_type.name) {
            self.coerce_scalar(&using_type.name).ok()
        } else {
            Some(self)
        }
    }
}

/// Coerce a resolved value into the named leaf type `type_name` for the
/// response. Values that don't fit become `null`.
pub(crate) fn coerce_leaf_value<'a>(
    value: r::Value,
    type_name: &str,
    resolver: &impl Fn(&str) -> Option<&'a s::TypeDefinition>,
) -> r::Value {
    if sast::is_builtin_scalar(type_name) {
        return value.coerce_scalar(type_name).unwrap_or(r::Value::Null);
    }
    match resolver(type_name) {
        Some(s::TypeDefinition::Enum(t)) => value.coerce(t),
        Some(s::TypeDefinition::Scalar(t)) => value.coerce(t),
        _ => None,
    }
    .unwrap_or(r::Value::Null)
}

fn coerce_to_definition<'a>(
    value: r::Value,
    definition: &str,
    resolver: &impl Fn(&str) -> Option<&'a s::TypeDefinition>,
) -> Result<r::Value, r::Value> {
    if sast::is_builtin_scalar(definition) {
        return value.coerce_scalar(definition);
    }

    match resolver(definition) {
        // Accept enum values if they match a value in the enum type
        Some(s::TypeDefinition::Enum(t)) => value.clone().coerce(t).ok_or(value),

        // Try to coerce Scalar values
        Some(s::TypeDefinition::Scalar(t)) => value.clone().coerce(t).ok_or(value),

        // Everything else is not an input type
        _ => Err(value),
    }
}

/// Turn a query literal into a value, replacing variable references with
/// their values. Returns the offending literal if it can't be represented.
fn literal_value(value: &q::Value, variables: &HashMap<String, r::Value>) -> Result<r::Value, r::Value> {
    match value {
        q::Value::Variable(name) => Ok(variables.get(name).cloned().unwrap_or(r::Value::Null)),
        q::Value::List(values) => values
            .iter()
            .map(|value| literal_value(value, variables))
            .collect::<Result<Vec<_>, _>>()
            .map(r::Value::List),
        q::Value::Object(map) => map
            .iter()
            .map(|(key, value)| Ok((key.clone(), literal_value(value, variables)?)))
            .collect::<Result<r::Object, _>>()
            .map(r::Value::Object),
        other => r::Value::try_from(other.clone()).map_err(|v| r::Value::String(v.to_string())),
    }
}

/// Coerces an argument into a GraphQL value.
///
/// `Ok(None)` happens when no value is found for a nullable type.
pub(crate) fn coerce_input_value<'a>(
    pos: Pos,
    value: Option<&q::Value>,
    def: &s::InputValue,
    resolver: &impl Fn(&str) -> Option<&'a s::TypeDefinition>,
    variable_values: &HashMap<String, r::Value>,
) -> Result<Option<r::Value>, QueryExecutionError> {
    let invalid = |value| QueryExecutionError::InvalidArgumentError(pos, def.name.to_owned(), value);

    let value = match value {
        // A variable that was not provided counts as a missing argument
        Some(q::Value::Variable(name)) => variable_values.get(name).cloned(),
        Some(value) => Some(literal_value(value, variable_values).map_err(invalid)?),
        None => None,
    };

    // Use the default value if necessary and present.
    let value = match value {
        Some(value) => Some(value),
        None => def
            .default_value
            .clone()
            .map(r::Value::try_from)
            .transpose()
            .map_err(|v| invalid(r::Value::String(v.to_string())))?,
    };

    // Extract value, checking for null or missing.
    let value = match value {
        None => {
            return if sast::is_non_null_type(&def.value_type) {
                Err(QueryExecutionError::MissingArgumentError(
                    pos,
                    def.name.to_owned(),
                ))
            } else {
                Ok(None)
            };
        }
        Some(value) => value,
    };

    coerce_value(value, &def.value_type, resolver)
        .map(Some)
        .map_err(invalid)
}

/// Coerce `value` into the input type `ty`. On failure, returns the value
/// that could not be coerced.
pub(crate) fn coerce_value<'a>(
    value: r::Value,
    ty: &s::Type,
    resolver: &impl Fn(&str) -> Option<&'a s::TypeDefinition>,
) -> Result<r::Value, r::Value> {
    match (ty, value) {
        // Null values cannot be coerced into non-null types.
        (s::Type::NonNullType(_), r::Value::Null) => Err(r::Value::Null),

        // Non-null values may be coercible into non-null types
        (s::Type::NonNullType(t), value) => coerce_value(value, t, resolver),

        // Nullable types can be null.
        (_, r::Value::Null) => Ok(r::Value::Null),

        // Resolve named types, then try to coerce the value into the resolved type
        (s::Type::NamedType(name), value) => coerce_to_definition(value, name, resolver),

        // List values are coercible if their values are coercible into the
        // inner type.
        (s::Type::ListType(t), r::Value::List(values)) => values
            .into_iter()
            .map(|value| coerce_value(value, t, resolver))
            .collect::<Result<Vec<_>, _>>()
            .map(r::Value::List),

        // A single value stands for a list with one element
        (s::Type::ListType(t), value) => {
            coerce_value(value, t, resolver).map(|value| r::Value::List(vec![value]))
        }
    }
}
