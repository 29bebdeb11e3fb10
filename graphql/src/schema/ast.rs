use graph::data::graphql::BUILTIN_SCALARS;
use graph::prelude::{s, DocumentExt, ObjectTypeExt, TypeExt};

/// Name of the meta field every object type answers with its own name.
pub const TYPENAME_FIELD: &str = "__typename";

/// Returns the field definition with the given name on an object type.
pub fn get_field<'a>(object_type: &'a s::ObjectType, name: &str) -> Option<&'a s::Field> {
    object_type.field(name)
}

/// Returns the argument definitions of a field of an object type.
pub fn get_argument_definitions<'a>(
    object_type: &'a s::ObjectType,
    name: &str,
) -> Option<&'a Vec<s::InputValue>> {
    get_field(object_type, name).map(|field| &field.arguments)
}

pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

pub fn is_non_null_type(t: &s::Type) -> bool {
    t.is_non_null()
}

/// Returns true if values of `t` can be passed as arguments or variables.
pub fn is_input_type(schema: &s::Document, t: &s::Type) -> bool {
    match t {
        s::Type::NamedType(name) if is_builtin_scalar(name) => true,
        s::Type::NamedType(name) => schema.get_named_type(name).map_or(false, |type_def| {
            matches!(
                type_def,
                s::TypeDefinition::Scalar(_) | s::TypeDefinition::Enum(_)
            )
        }),
        s::Type::ListType(inner) => is_input_type(schema, inner),
        s::Type::NonNullType(inner) => is_input_type(schema, inner),
    }
}

/// Returns true if `t` names a leaf type, i.e. a scalar or an enum, which
/// must not have a selection set.
pub fn is_leaf_type(schema: &s::Document, t: &s::Type) -> bool {
    let base = t.get_base_type();
    is_builtin_scalar(base)
        || matches!(
            schema.get_named_type(base),
            Some(s::TypeDefinition::Scalar(_)) | Some(s::TypeDefinition::Enum(_))
        )
}
