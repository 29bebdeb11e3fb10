use std::collections::HashMap;

use graph::graphql_parser::Pos;
use graph::prelude::{async_trait, q, r, s, QueryExecutionError, ResponsePath};

/// Coerced argument values of a field, keyed by argument name.
pub type ArgumentValues = HashMap<String, r::Value>;

/// Everything a resolver gets to know about the field it resolves.
#[derive(Clone, Copy)]
pub struct FieldInfo<'a> {
    /// The type the field is defined on.
    pub object_type: &'a s::ObjectType,
    pub field_definition: &'a s::Field,
    /// The first occurrence of the field in the query.
    pub field: &'a q::Field,
    pub path: &'a ResponsePath,
}

impl<'a> FieldInfo<'a> {
    pub fn name(&self) -> &'a str {
        &self.field.name
    }

    pub fn type_name(&self) -> &'a str {
        &self.object_type.name
    }

    /// Where the field appears in the query text.
    pub fn position(&self) -> Pos {
        self.field.position
    }
}

/// The value of a field, along with errors for parts of it. Each error
/// carries the full response path of the part it is about; that part of
/// `value` is already null.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    pub value: r::Value,
    pub errors: Vec<(ResponsePath, QueryExecutionError)>,
}

impl From<r::Value> for Resolved {
    fn from(value: r::Value) -> Self {
        Resolved {
            value,
            errors: Vec::new(),
        }
    }
}

/// Produces field values for the executor.
///
/// The executor completes whatever a resolver returns: objects and lists of
/// objects are walked again for the requested sub-selection, scalars are
/// coerced to their declared type.
#[async_trait]
pub trait Resolver: Send + Sync + 'static {
    /// Resolves a field of the root query type.
    async fn resolve_root_field(
        &self,
        field: &FieldInfo<'_>,
        arguments: &ArgumentValues,
    ) -> Result<r::Value, QueryExecutionError>;

    /// Resolves a field on a parent object.
    async fn resolve_field(
        &self,
        parent: &r::Value,
        field: &FieldInfo<'_>,
        arguments: &ArgumentValues,
    ) -> Result<Resolved, QueryExecutionError>;
}

/// The field resolver used for every field nobody claims: read the field
/// name as a key on the parent object. A missing key is `null`, not an error.
pub fn default_field_value(parent: &r::Value, field_name: &str) -> r::Value {
    parent
        .as_object()
        .and_then(|object| object.get(field_name))
        .cloned()
        .unwrap_or(r::Value::Null)
}
