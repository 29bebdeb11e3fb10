use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use graph::data::query::Query as GraphDataQuery;
use graph::prelude::{
    info, o, q, r, s, CheapClone, DocumentExt, Logger, QueryExecutionError, QueryVariables,
    Schema, TypeExt,
};

use crate::query::ast as qast;
use crate::schema::ast as sast;
use crate::values::coercion;

/// Helper to log the fields in a `SelectionSet` without cloning. Writes
/// a list of field names from the selection set separated by ';'. Using
/// ';' as a separator makes parsing the log a little easier since slog
/// uses ',' to separate key/value pairs.
struct SelectedFields<'a>(&'a q::SelectionSet);

impl<'a> std::fmt::Display for SelectedFields<'a> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let mut first = true;
        for item in &self.0.items {
            if let q::Selection::Field(field) = item {
                if !first {
                    write!(fmt, ";")?;
                }
                first = false;
                write!(fmt, "{}", qast::get_response_key(field))?
            }
        }
        if first {
            // Only fragments at the top level
            write!(fmt, "-")?;
        }
        Ok(())
    }
}

/// A GraphQL query that has been preprocessed and checked and is ready
/// for execution. Checking includes validating all query fields against the
/// schema, coercing variables and enforcing the maximum depth.
pub struct Query {
    /// The schema against which to execute the query
    pub schema: Arc<Schema>,
    /// The root selection set of the selected operation
    pub selection_set: q::SelectionSet,
    /// The variables for the query, coerced into proper values
    pub variables: HashMap<String, r::Value>,

    pub logger: Logger,

    start: Instant,

    fragments: HashMap<String, q::FragmentDefinition>,

    /// Used only for logging
    pub query_text: Arc<String>,
    pub variables_text: Arc<String>,
    pub query_id: String,
}

impl Query {
    /// Process the raw GraphQL query `query` and prepare for executing it.
    /// The returned `Query` has already been validated; if validation
    /// fails, all errors found are returned and nothing may be executed.
    pub fn new(
        logger: &Logger,
        schema: Arc<Schema>,
        query: GraphDataQuery,
        max_depth: u8,
    ) -> Result<Arc<Self>, Vec<QueryExecutionError>> {
        let operation =
            qast::get_operation(&query.document, query.operation_name.as_deref())?.clone();

        let mut fragments = HashMap::new();
        for defn in query.document.definitions.into_iter() {
            if let q::Definition::Fragment(frag) = defn {
                fragments.insert(frag.name.clone(), frag);
            }
        }

        let variables = coerce_variables(schema.as_ref(), &operation, query.variables)?;
        let selection_set = match operation {
            q::OperationDefinition::Query(q::Query { selection_set, .. }) => selection_set,
            // Queries can be run by just sending a selection set
            q::OperationDefinition::SelectionSet(selection_set) => selection_set,
            q::OperationDefinition::Mutation(_) | q::OperationDefinition::Subscription(_) => {
                return Err(vec![QueryExecutionError::NotSupported(
                    "Only queries are supported".to_owned(),
                )])
            }
        };

        let query_id = uuid::Uuid::new_v4().to_string();
        let logger = logger.new(o!("query_id" => query_id.clone()));

        let query = Self {
            schema,
            selection_set,
            variables,
            logger,
            start: Instant::now(),
            fragments,
            query_text: query.query_text.cheap_clone(),
            variables_text: query.variables_text.cheap_clone(),
            query_id,
        };

        // Check the depth first, so `validate_fields` can't recurse through
        // cyclical fragments
        query.check_depth(max_depth)?;
        query.validate_fields()?;

        Ok(Arc::new(query))
    }

    pub fn get_fragment(&self, name: &str) -> Option<&q::FragmentDefinition> {
        self.fragments.get(name)
    }

    /// Log the query, its variables and how long it took since it was
    /// received.
    pub fn log_execution(&self) {
        info!(
            &self.logger,
            "Query timing (GraphQL)";
            "query" => self.query_text.as_str(),
            "variables" => self.variables_text.as_str(),
            "query_time_ms" => self.start.elapsed().as_millis(),
            "fields" => SelectedFields(&self.selection_set).to_string(),
        );
    }

    fn check_depth(&self, max_depth: u8) -> Result<(), Vec<QueryExecutionError>> {
        self.check_depth_inner(&self.selection_set, max_depth, 0, &HashSet::new())
            .map_err(|e| vec![e])
    }

    fn check_depth_inner<'a>(
        &'a self,
        selection_set: &'a q::SelectionSet,
        max_depth: u8,
        depth: u8,
        visited_fragments: &HashSet<&'a str>,
    ) -> Result<(), QueryExecutionError> {
        if depth >= max_depth {
            return Err(QueryExecutionError::TooDeep(max_depth));
        }

        for selection in &selection_set.items {
            match selection {
                q::Selection::Field(field) => {
                    // Empty selection sets are the base case.
                    if !field.selection_set.items.is_empty() {
                        self.check_depth_inner(
                            &field.selection_set,
                            max_depth,
                            depth + 1,
                            visited_fragments,
                        )?;
                    }
                }
                q::Selection::FragmentSpread(spread) => {
                    // Undefined fragments are reported by `validate_fields`
                    if let Some(def) = self.fragments.get(&spread.fragment_name) {
                        // Copy `visited_fragments` on write.
                        let mut visited_fragments = visited_fragments.clone();
                        if !visited_fragments.insert(&spread.fragment_name) {
                            return Err(QueryExecutionError::CyclicalFragment(
                                spread.fragment_name.clone(),
                            ));
                        }
                        self.check_depth_inner(
                            &def.selection_set,
                            max_depth,
                            depth + 1,
                            &visited_fragments,
                        )?;
                    }
                }
                q::Selection::InlineFragment(fragment) => {
                    self.check_depth_inner(
                        &fragment.selection_set,
                        max_depth,
                        depth + 1,
                        visited_fragments,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn validate_fields(&self) -> Result<(), Vec<QueryExecutionError>> {
        let root_type = self.schema.query_type();

        let errors = self.validate_fields_inner(root_type, &self.selection_set);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_fields_inner(
        &self,
        ty: &s::ObjectType,
        selection_set: &q::SelectionSet,
    ) -> Vec<QueryExecutionError> {
        let schema = &self.schema.document;

        selection_set
            .items
            .iter()
            .fold(vec![], |mut errors, selection| {
                match selection {
                    q::Selection::Field(field) if field.name == sast::TYPENAME_FIELD => {
                        if !field.selection_set.items.is_empty() {
                            errors.push(QueryExecutionError::UnexpectedSelectionSet(
                                field.position,
                                field.name.clone(),
                                "String".to_owned(),
                            ));
                        }
                    }
                    q::Selection::Field(field) => match sast::get_field(ty, &field.name) {
                        Some(s_field) => {
                            let base_type = s_field.field_type.get_base_type();
                            let has_selection = !field.selection_set.items.is_empty();
                            if let Some(object_type) = self.schema.object_type(base_type) {
                                if has_selection {
                                    errors.extend(
                                        self.validate_fields_inner(object_type, &field.selection_set),
                                    )
                                } else {
                                    errors.push(QueryExecutionError::MissingSelectionSet(
                                        field.position,
                                        field.name.clone(),
                                        s_field.field_type.to_string(),
                                    ))
                                }
                            } else if !sast::is_leaf_type(schema, &s_field.field_type) {
                                errors.push(QueryExecutionError::NamedTypeError(
                                    base_type.to_owned(),
                                ));
                            } else if has_selection {
                                errors.push(QueryExecutionError::UnexpectedSelectionSet(
                                    field.position,
                                    field.name.clone(),
                                    base_type.to_owned(),
                                ))
                            }
                        }
                        None => errors.push(QueryExecutionError::UnknownField(
                            field.position,
                            ty.name.clone(),
                            field.name.clone(),
                        )),
                    },
                    q::Selection::FragmentSpread(fragment) => {
                        match self.fragments.get(&fragment.fragment_name) {
                            Some(frag) => {
                                let q::TypeCondition::On(type_name) = &frag.type_condition;
                                match self.schema.object_type(type_name) {
                                    Some(ty) => errors
                                        .extend(self.validate_fields_inner(ty, &frag.selection_set)),
                                    None => errors.push(QueryExecutionError::NamedTypeError(
                                        type_name.clone(),
                                    )),
                                }
                            }
                            None => errors.push(QueryExecutionError::UndefinedFragment(
                                fragment.fragment_name.clone(),
                            )),
                        }
                    }
                    q::Selection::InlineFragment(fragment) => match &fragment.type_condition {
                        Some(q::TypeCondition::On(type_name)) => {
                            match self.schema.object_type(type_name) {
                                Some(ty) => errors
                                    .extend(self.validate_fields_inner(ty, &fragment.selection_set)),
                                None => errors
                                    .push(QueryExecutionError::NamedTypeError(type_name.clone())),
                            }
                        }
                        None => errors.extend(self.validate_fields_inner(ty, &fragment.selection_set)),
                    },
                }
                errors
            })
    }
}

/// Coerces variable values for an operation.
pub fn coerce_variables(
    schema: &Schema,
    operation: &q::OperationDefinition,
    mut variables: Option<QueryVariables>,
) -> Result<HashMap<String, r::Value>, Vec<QueryExecutionError>> {
    let mut coerced_values = HashMap::new();
    let mut errors = vec![];

    for variable_def in qast::get_variable_definitions(operation)
        .into_iter()
        .flatten()
    {
        // Skip variable if it has an invalid type
        if !sast::is_input_type(&schema.document, &variable_def.var_type) {
            errors.push(QueryExecutionError::InvalidVariableTypeError(
                variable_def.position,
                variable_def.name.to_owned(),
            ));
            continue;
        }

        let value = variables
            .as_mut()
            .and_then(|vars| vars.remove(&variable_def.name));

        let default_value = match variable_def.default_value.clone().map(r::Value::try_from) {
            Some(Ok(value)) => Some(value),
            Some(Err(value)) => {
                errors.push(QueryExecutionError::InvalidVariableError(
                    variable_def.position,
                    variable_def.name.to_owned(),
                    r::Value::String(value.to_string()),
                ));
                continue;
            }
            None => None,
        };

        let value = match value.or(default_value) {
            // No variable value provided and no default for non-null type, fail
            None => {
                if sast::is_non_null_type(&variable_def.var_type) {
                    errors.push(QueryExecutionError::MissingVariableError(
                        variable_def.position,
                        variable_def.name.to_owned(),
                    ));
                };
                continue;
            }
            Some(value) => value,
        };

        // We have a variable value, attempt to coerce it to the value type
        // of the variable definition
        match coerce_variable(schema, variable_def, value) {
            Ok(value) => {
                coerced_values.insert(variable_def.name.to_owned(), value);
            }
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(coerced_values)
    } else {
        Err(errors)
    }
}

fn coerce_variable(
    schema: &Schema,
    variable_def: &q::VariableDefinition,
    value: r::Value,
) -> Result<r::Value, QueryExecutionError> {
    let resolver = |name: &str| schema.document.get_named_type(name);

    coercion::coerce_value(value, &variable_def.var_type, &resolver).map_err(|value| {
        QueryExecutionError::InvalidVariableError(
            variable_def.position,
            variable_def.name.to_owned(),
            value,
        )
    })
}
