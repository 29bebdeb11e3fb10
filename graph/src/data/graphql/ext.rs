use crate::prelude::s::{Definition, Document, Field, ObjectType, Type, TypeDefinition};

/// Names of the scalars every schema knows without declaring them.
pub const BUILTIN_SCALARS: [&str; 5] = ["ID", "String", "Int", "Float", "Boolean"];

pub trait ObjectTypeExt {
    fn field(&self, name: &str) -> Option<&Field>;
}

impl ObjectTypeExt for ObjectType {
    fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

pub trait DocumentExt {
    fn get_object_type_definitions(&self) -> Vec<&ObjectType>;

    fn get_object_type(&self, name: &str) -> Option<&ObjectType>;

    fn get_named_type(&self, name: &str) -> Option<&TypeDefinition>;

    /// Name of the root query type: the one named by a `schema { query: .. }`
    /// definition, otherwise `Query`.
    fn root_query_type_name(&self) -> &str;

    fn get_root_query_type(&self) -> Option<&ObjectType>;

    /// Whether `name` is a defined type or one of the built-in scalars.
    fn is_known_type(&self, name: &str) -> bool;
}

impl DocumentExt for Document {
    fn get_object_type_definitions(&self) -> Vec<&ObjectType> {
        self.definitions
            .iter()
            .filter_map(|d| match d {
                Definition::TypeDefinition(TypeDefinition::Object(t)) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn get_object_type(&self, name: &str) -> Option<&ObjectType> {
        self.definitions.iter().find_map(|d| match d {
            Definition::TypeDefinition(TypeDefinition::Object(t)) if t.name == name => Some(t),
            _ => None,
        })
    }

    fn get_named_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.definitions.iter().find_map(|d| match d {
            Definition::TypeDefinition(def) if type_definition_name(def) == name => Some(def),
            _ => None,
        })
    }

    fn root_query_type_name(&self) -> &str {
        self.definitions
            .iter()
            .find_map(|d| match d {
                Definition::SchemaDefinition(schema) => schema.query.as_deref(),
                _ => None,
            })
            .unwrap_or("Query")
    }

    fn get_root_query_type(&self) -> Option<&ObjectType> {
        self.get_object_type(self.root_query_type_name())
    }

    fn is_known_type(&self, name: &str) -> bool {
        BUILTIN_SCALARS.contains(&name) || self.get_named_type(name).is_some()
    }
}

pub fn type_definition_name(def: &TypeDefinition) -> &str {
    match def {
        TypeDefinition::Scalar(t) => &t.name,
        TypeDefinition::Object(t) => &t.name,
        TypeDefinition::Interface(t) => &t.name,
        TypeDefinition::Union(t) => &t.name,
        TypeDefinition::Enum(t) => &t.name,
        TypeDefinition::InputObject(t) => &t.name,
    }
}

pub trait TypeExt {
    fn get_base_type(&self) -> &str;

    fn is_non_null(&self) -> bool;

    /// Whether the type is a list, looking through an outer non-null wrapper.
    fn is_list(&self) -> bool;
}

impl TypeExt for Type {
    fn get_base_type(&self) -> &str {
        match self {
            Type::NamedType(name) => name,
            Type::NonNullType(inner) => inner.get_base_type(),
            Type::ListType(inner) => inner.get_base_type(),
        }
    }

    fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNullType(_))
    }

    fn is_list(&self) -> bool {
        match self {
            Type::NamedType(_) => false,
            Type::NonNullType(inner) => inner.is_list(),
            Type::ListType(_) => true,
        }
    }
}
