use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::data::graphql::{type_definition_name, DocumentExt, TypeExt};
use crate::prelude::s;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Schema file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read schema file {}: {}", .0.display(), .1)]
    Unreadable(PathBuf, String),
    #[error("Failed to parse schema: {0}")]
    ParseError(String),
    #[error("Root query type `{0}` is not defined")]
    NoRootQueryType(String),
    #[error("Type `{0}` is defined more than once")]
    DuplicateType(String),
    #[error("Field `{1}` of type `{0}` references undefined type `{2}`")]
    UndefinedType(String, String, String),
    #[error("Argument `{2}` of `{0}.{1}` must have an input type, not `{3}`")]
    InvalidArgumentType(String, String, String, String),
    #[error("{0} types are not supported: `{1}`")]
    UnsupportedType(&'static str, String),
}

/// How a field's value is shaped in the response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldShape {
    Scalar,
    Object,
    ScalarList,
    ObjectList,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescription {
    pub name: String,
    /// The declared type as written in the schema, e.g. `[Post]` or `ID!`
    pub field_type: String,
    pub shape: FieldShape,
    /// Argument names and their declared types, in declaration order
    pub arguments: Vec<(String, String)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescription {
    pub name: String,
    pub fields: Vec<FieldDescription>,
}

/// A validated type schema. Built once from SDL text and shared read-only
/// between all requests.
#[derive(Clone, Debug)]
pub struct Schema {
    pub document: s::Document,
    query_type: s::ObjectType,
}

impl Schema {
    /// Parse and validate SDL text. Building is pure: the same text always
    /// yields the same schema.
    pub fn parse(raw: &str) -> Result<Self, SchemaError> {
        let document = graphql_parser::parse_schema(raw)
            .map_err(|e| SchemaError::ParseError(e.to_string()))?
            .into_static();

        validate(&document)?;
        let query_type = document
            .get_root_query_type()
            .cloned()
            .ok_or_else(|| {
                SchemaError::NoRootQueryType(document.root_query_type_name().to_owned())
            })?;
        Ok(Schema {
            document,
            query_type,
        })
    }

    /// Read and parse the SDL file at `path`.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SchemaError::NotFound(path.to_owned()),
            _ => SchemaError::Unreadable(path.to_owned(), e.to_string()),
        })?;
        Self::parse(&raw)
    }

    pub fn query_type_name(&self) -> &str {
        &self.query_type.name
    }

    pub fn query_type(&self) -> &s::ObjectType {
        &self.query_type
    }

    pub fn object_type(&self, name: &str) -> Option<&s::ObjectType> {
        self.document.get_object_type(name)
    }

    pub fn is_object_type(&self, name: &str) -> bool {
        self.object_type(name).is_some()
    }

    /// The shape of values of type `field_type`.
    pub fn shape_of(&self, field_type: &s::Type) -> FieldShape {
        let is_object = self.is_object_type(field_type.get_base_type());
        match (field_type.is_list(), is_object) {
            (false, false) => FieldShape::Scalar,
            (false, true) => FieldShape::Object,
            (true, false) => FieldShape::ScalarList,
            (true, true) => FieldShape::ObjectList,
        }
    }

    /// Describe every object type in declaration order.
    pub fn object_types(&self) -> Vec<TypeDescription> {
        self.document
            .get_object_type_definitions()
            .into_iter()
            .map(|object_type| TypeDescription {
                name: object_type.name.clone(),
                fields: object_type
                    .fields
                    .iter()
                    .map(|field| FieldDescription {
                        name: field.name.clone(),
                        field_type: field.field_type.to_string(),
                        shape: self.shape_of(&field.field_type),
                        arguments: field
                            .arguments
                            .iter()
                            .map(|arg| (arg.name.clone(), arg.value_type.to_string()))
                            .collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}

fn type_definitions(document: &s::Document) -> impl Iterator<Item = &s::TypeDefinition> {
    document.definitions.iter().filter_map(|d| match d {
        s::Definition::TypeDefinition(def) => Some(def),
        _ => None,
    })
}

fn validate(document: &s::Document) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for def in type_definitions(document) {
        let name = type_definition_name(def);
        if !seen.insert(name) {
            return Err(SchemaError::DuplicateType(name.to_owned()));
        }
        match def {
            s::TypeDefinition::Interface(t) => {
                return Err(SchemaError::UnsupportedType("Interface", t.name.clone()))
            }
            s::TypeDefinition::Union(t) => {
                return Err(SchemaError::UnsupportedType("Union", t.name.clone()))
            }
            s::TypeDefinition::InputObject(t) => {
                return Err(SchemaError::UnsupportedType("Input object", t.name.clone()))
            }
            s::TypeDefinition::Scalar(_)
            | s::TypeDefinition::Enum(_)
            | s::TypeDefinition::Object(_) => {}
        }
    }

    for object_type in document.get_object_type_definitions() {
        for field in &object_type.fields {
            let base = field.field_type.get_base_type();
            if !document.is_known_type(base) {
                return Err(SchemaError::UndefinedType(
                    object_type.name.clone(),
                    field.name.clone(),
                    base.to_owned(),
                ));
            }
            for arg in &field.arguments {
                let arg_base = arg.value_type.get_base_type();
                if !document.is_known_type(arg_base) {
                    return Err(SchemaError::UndefinedType(
                        object_type.name.clone(),
                        field.name.clone(),
                        arg_base.to_owned(),
                    ));
                }
                if document.get_object_type(arg_base).is_some() {
                    return Err(SchemaError::InvalidArgumentType(
                        object_type.name.clone(),
                        field.name.clone(),
                        arg.name.clone(),
                        arg.value_type.to_string(),
                    ));
                }
            }
        }
    }
    Ok(())
}
