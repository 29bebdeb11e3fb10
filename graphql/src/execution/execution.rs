use async_recursion::async_recursion;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Instant;

use graph::prelude::*;

use crate::execution::resolver::{ArgumentValues, FieldInfo, Resolved, Resolver};
use crate::execution::Query;
use crate::query::ast as qast;
use crate::schema::ast as sast;
use crate::values::coercion;

/// Why a value could not be produced. When this is returned, the error
/// that caused it has already been recorded in the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    /// A non-null position ended up null; the nearest nullable parent
    /// becomes null instead.
    Null,
    /// The deadline passed; nothing more gets executed.
    Timeout,
}

/// Contextual information passed around during query execution.
pub struct ExecutionContext<R>
where
    R: Resolver,
{
    /// The logger to use.
    pub logger: Logger,

    /// The query to execute.
    pub query: Arc<Query>,

    /// The resolver to use.
    pub resolver: Arc<R>,

    /// Time at which the query times out.
    pub deadline: Option<Instant>,

    /// Field errors encountered so far, in the order they happened.
    errors: Mutex<Vec<QueryError>>,
}

impl<R> ExecutionContext<R>
where
    R: Resolver,
{
    pub fn new(
        logger: Logger,
        query: Arc<Query>,
        resolver: Arc<R>,
        deadline: Option<Instant>,
    ) -> Self {
        ExecutionContext {
            logger,
            query,
            resolver,
            deadline,
            errors: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, error: QueryExecutionError, path: &ResponsePath) {
        if error.is_internal() {
            error!(self.logger, "Failed to resolve field";
                   "path" => path.to_string(), "error" => error.to_string());
        }
        self.errors.lock().push(QueryError::FieldError {
            error,
            path: path.clone(),
        });
    }

    /// Record `error` for the field at `path` and null the field out.
    fn field_error(
        &self,
        error: QueryExecutionError,
        path: &ResponsePath,
        field_type: &s::Type,
    ) -> Result<r::Value, Failure> {
        self.record(error, path);
        if field_type.is_non_null() {
            Err(Failure::Null)
        } else {
            Ok(r::Value::Null)
        }
    }

    fn timed_out(&self) -> bool {
        self.deadline
            .map_or(false, |deadline| deadline < Instant::now())
    }

    /// The errors recorded during execution.
    pub fn take_errors(&self) -> Vec<QueryError> {
        std::mem::take(&mut *self.errors.lock())
    }
}

/// Executes the root selection set of a query. The result is `null` when a
/// non-null root field failed.
pub async fn execute_root_selection_set<R>(
    ctx: &ExecutionContext<R>,
) -> Result<r::Value, QueryExecutionError>
where
    R: Resolver,
{
    let query = ctx.query.cheap_clone();
    let query_type = query.schema.query_type();
    let selection_sets = [&query.selection_set];

    match execute_selection_set(ctx, &selection_sets, query_type, None, &ResponsePath::root())
        .await
    {
        Ok(object) => Ok(r::Value::Object(object)),
        Err(Failure::Null) => Ok(r::Value::Null),
        Err(Failure::Timeout) => Err(QueryExecutionError::Timeout),
    }
}

/// Executes a selection set, requiring the result to be of the given object type.
///
/// `object_value` is `None` for the root query type and the parent object
/// otherwise. Several selection sets are passed when fields with the same
/// response key are merged.
#[async_recursion]
async fn execute_selection_set<'a, R>(
    ctx: &'a ExecutionContext<R>,
    selection_sets: &[&'a q::SelectionSet],
    object_type: &'a s::ObjectType,
    object_value: Option<&'a r::Value>,
    path: &ResponsePath,
) -> Result<r::Object, Failure>
where
    R: Resolver,
{
    let mut result_map = r::Object::new();

    // Group fields with the same response key, so we can execute them together
    let grouped_field_set = collect_fields(ctx, object_type, selection_sets);

    // Process all field groups in order
    for (response_key, fields) in grouped_field_set {
        if ctx.timed_out() {
            return Err(Failure::Timeout);
        }

        let field = fields[0];
        let field_path = path.field(response_key);

        if field.name == sast::TYPENAME_FIELD {
            result_map.insert(
                response_key.to_owned(),
                r::Value::String(object_type.name.clone()),
            );
            continue;
        }

        let value = match sast::get_field(object_type, &field.name) {
            Some(field_definition) => {
                let info = FieldInfo {
                    object_type,
                    field_definition,
                    field,
                    path: &field_path,
                };
                execute_field(ctx, object_value, info, &fields).await?
            }
            // Validation makes sure this does not happen
            None => {
                ctx.record(
                    QueryExecutionError::UnknownField(
                        field.position,
                        object_type.name.clone(),
                        field.name.clone(),
                    ),
                    &field_path,
                );
                r::Value::Null
            }
        };
        result_map.insert(response_key.to_owned(), value);
    }

    Ok(result_map)
}

/// Collects fields of a selection set.
fn collect_fields<'a, R>(
    ctx: &'a ExecutionContext<R>,
    object_type: &s::ObjectType,
    selection_sets: &[&'a q::SelectionSet],
) -> IndexMap<&'a str, Vec<&'a q::Field>>
where
    R: Resolver,
{
    let mut grouped_fields = IndexMap::new();
    let mut visited_fragments = HashSet::new();
    for selection_set in selection_sets.iter().copied() {
        collect_fields_inner(
            ctx,
            object_type,
            selection_set,
            &mut visited_fragments,
            &mut grouped_fields,
        );
    }
    grouped_fields
}

fn collect_fields_inner<'a, R>(
    ctx: &'a ExecutionContext<R>,
    object_type: &s::ObjectType,
    selection_set: &'a q::SelectionSet,
    visited_fragments: &mut HashSet<&'a str>,
    output: &mut IndexMap<&'a str, Vec<&'a q::Field>>,
) where
    R: Resolver,
{
    let variables = &ctx.query.variables;

    // Only consider selections that are not skipped and should be included
    let selections = selection_set
        .items
        .iter()
        .filter(|selection| !qast::skip_selection(selection, variables))
        .filter(|selection| qast::include_selection(selection, variables));

    for selection in selections {
        match selection {
            q::Selection::Field(field) => {
                // Create a field group for this response key on demand and
                // append the selection field to this group.
                let response_key = qast::get_response_key(field);
                output.entry(response_key).or_default().push(field);
            }

            q::Selection::FragmentSpread(spread) => {
                // Only consider the fragment if it hasn't already been included,
                // as would be the case if the same fragment spread ...Foo appeared
                // twice in the same selection set
                if visited_fragments.insert(&spread.fragment_name) {
                    if let Some(fragment) = ctx.query.get_fragment(&spread.fragment_name) {
                        let q::TypeCondition::On(type_name) = &fragment.type_condition;
                        if does_fragment_type_apply(object_type, Some(type_name)) {
                            collect_fields_inner(
                                ctx,
                                object_type,
                                &fragment.selection_set,
                                visited_fragments,
                                output,
                            );
                        }
                    }
                }
            }

            q::Selection::InlineFragment(fragment) => {
                let type_name = fragment.type_condition.as_ref().map(|condition| {
                    let q::TypeCondition::On(type_name) = condition;
                    type_name
                });
                if does_fragment_type_apply(object_type, type_name) {
                    collect_fields_inner(
                        ctx,
                        object_type,
                        &fragment.selection_set,
                        visited_fragments,
                        output,
                    );
                }
            }
        };
    }
}

/// Determines whether a fragment is applicable to the given object type.
/// Without a type condition, it always is.
fn does_fragment_type_apply(object_type: &s::ObjectType, type_condition: Option<&String>) -> bool {
    type_condition.map_or(true, |name| *name == object_type.name)
}

/// Executes a field.
async fn execute_field<'a, R>(
    ctx: &'a ExecutionContext<R>,
    object_value: Option<&'a r::Value>,
    info: FieldInfo<'a>,
    fields: &[&'a q::Field],
) -> Result<r::Value, Failure>
where
    R: Resolver,
{
    let field_type = &info.field_definition.field_type;

    let arguments = match coerce_argument_values(ctx, &info) {
        Ok(arguments) => arguments,
        Err(e) => return ctx.field_error(e, info.path, field_type),
    };

    let resolved = match object_value {
        None => ctx
            .resolver
            .resolve_root_field(&info, &arguments)
            .await
            .map(Resolved::from),
        Some(parent) => ctx.resolver.resolve_field(parent, &info, &arguments).await,
    };
    let value = match resolved {
        Ok(Resolved { value, errors }) => {
            for (path, e) in errors {
                ctx.record(e, &path);
            }
            value
        }
        Err(e) => return ctx.field_error(e, info.path, field_type),
    };

    match complete_value(ctx, &info, field_type, fields, value, info.path).await {
        // The field is where a failure below it stops, unless the field
        // itself can't be null
        Err(Failure::Null) if !field_type.is_non_null() => Ok(r::Value::Null),
        result => result,
    }
}

/// Ensures that a value matches the expected return type, and executes the
/// sub-selection for object values.
#[async_recursion]
async fn complete_value<'a, R>(
    ctx: &'a ExecutionContext<R>,
    info: &FieldInfo<'a>,
    field_type: &'a s::Type,
    fields: &[&'a q::Field],
    resolved_value: r::Value,
    path: &ResponsePath,
) -> Result<r::Value, Failure>
where
    R: Resolver,
{
    match field_type {
        // Fail if the field type is non-null but the value is null
        s::Type::NonNullType(inner_type) => {
            let value = complete_value(ctx, info, inner_type, fields, resolved_value, path).await?;
            if value.is_null() {
                ctx.record(
                    QueryExecutionError::NonNullError(info.position(), info.name().to_owned()),
                    path,
                );
                Err(Failure::Null)
            } else {
                Ok(value)
            }
        }

        // If the resolved value is null, return null
        _ if resolved_value.is_null() => Ok(resolved_value),

        // Complete list values
        s::Type::ListType(inner_type) => match resolved_value {
            // Complete list values individually
            r::Value::List(values) => {
                let mut out = Vec::with_capacity(values.len());
                for (index, value) in values.into_iter().enumerate() {
                    let item_path = path.index(index);
                    let item =
                        match complete_value(ctx, info, inner_type, fields, value, &item_path)
                            .await
                        {
                            Err(Failure::Null) if !inner_type.is_non_null() => r::Value::Null,
                            item => item?,
                        };
                    out.push(item);
                }
                Ok(r::Value::List(out))
            }

            // Return field error if the resolved value for the list is not a list
            _ => {
                ctx.record(
                    QueryExecutionError::ListValueError(info.position(), info.name().to_owned()),
                    path,
                );
                Err(Failure::Null)
            }
        },

        s::Type::NamedType(name) => match ctx.query.schema.object_type(name) {
            // Complete object types recursively
            Some(object_type) => {
                let selection_sets: Vec<_> =
                    fields.iter().map(|field| &field.selection_set).collect();
                execute_selection_set(
                    ctx,
                    &selection_sets,
                    object_type,
                    Some(&resolved_value),
                    path,
                )
                .await
                .map(r::Value::Object)
            }

            // Complete scalar and enum values
            None => {
                let document = &ctx.query.schema.document;
                let resolver = |name: &str| document.get_named_type(name);
                Ok(coercion::coerce_leaf_value(resolved_value, name, &resolver))
            }
        },
    }
}

/// Coerces argument values into GraphQL values.
fn coerce_argument_values<R>(
    ctx: &ExecutionContext<R>,
    info: &FieldInfo<'_>,
) -> Result<ArgumentValues, QueryExecutionError>
where
    R: Resolver,
{
    let document = &ctx.query.schema.document;
    let resolver = |name: &str| document.get_named_type(name);

    let mut coerced_values = ArgumentValues::new();
    for argument_def in &info.field_definition.arguments {
        let value = qast::get_argument_value(&info.field.arguments, &argument_def.name);
        if let Some(value) = coercion::coerce_input_value(
            info.position(),
            value,
            argument_def,
            &resolver,
            &ctx.query.variables,
        )? {
            coerced_values.insert(argument_def.name.clone(), value);
        }
    }
    Ok(coerced_values)
}
