//! Two-tier field dispatch.
//!
//! Every object type of the schema is bound to a [`TypeResolver`] once, when
//! the registry is built. Fields of a type with an override go to the
//! override first; whatever it does not claim, and every field of a type
//! without an override, is read from the parent object by the default
//! resolver. Root fields are produced by the entries of the root value map.

use indexmap::IndexMap;
use std::collections::HashMap;
use thiserror::Error;

use graph::prelude::*;

use crate::execution::{default_field_value, ArgumentValues, FieldInfo, Resolved, Resolver};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Cannot register a resolver for type `{0}`: the schema does not define it")]
    UnknownType(String),
    #[error("Cannot register root field `{0}`: the root query type does not define it")]
    UnknownRootField(String),
}

/// What an override resolver made of a field.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Value(r::Value),
    /// A value where some parts failed and were nulled.
    Partial(Resolved),
    /// The override does not handle this field; use the default resolver.
    Default,
}

/// A resolver for the fields of one object type.
#[async_trait]
pub trait ObjectResolver: Send + Sync {
    async fn resolve(
        &self,
        parent: &r::Value,
        field: &FieldInfo<'_>,
        arguments: &ArgumentValues,
    ) -> Result<Resolution, QueryExecutionError>;
}

/// How the fields of an object type are resolved.
#[derive(Clone)]
pub enum TypeResolver {
    Default,
    Override(Arc<dyn ObjectResolver>),
}

impl std::fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeResolver::Default => write!(f, "Default"),
            TypeResolver::Override(_) => write!(f, "Override"),
        }
    }
}

/// Produces the value of a root list field such as `users`.
#[async_trait]
pub trait ListProducer: Send + Sync {
    async fn produce(&self) -> Result<Vec<r::Value>, QueryExecutionError>;
}

/// Produces the value of a root field that picks one entity, such as
/// `user(id:)`. Yields `null` when there is no such entity.
#[async_trait]
pub trait EntityProducer: Send + Sync {
    async fn produce(
        &self,
        root: &r::Value,
        arguments: &ArgumentValues,
    ) -> Result<r::Value, QueryExecutionError>;
}

#[derive(Clone)]
pub enum RootField {
    List(Arc<dyn ListProducer>),
    Entity(Arc<dyn EntityProducer>),
}

/// Binds object types to their resolvers and root fields to their producers.
pub struct ResolverRegistry {
    types: HashMap<String, TypeResolver>,
    root_fields: IndexMap<String, RootField>,
    root_value: r::Value,
}

impl ResolverRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The resolver bound to `type_name`, if the schema defines that type.
    pub fn type_resolver(&self, type_name: &str) -> Option<&TypeResolver> {
        self.types.get(type_name)
    }

    pub fn root_field_names(&self) -> impl Iterator<Item = &str> {
        self.root_fields.keys().map(String::as_str)
    }
}

#[async_trait]
impl Resolver for ResolverRegistry {
    async fn resolve_root_field(
        &self,
        field: &FieldInfo<'_>,
        arguments: &ArgumentValues,
    ) -> Result<r::Value, QueryExecutionError> {
        match self.root_fields.get(field.name()) {
            Some(RootField::List(producer)) => producer.produce().await.map(r::Value::List),
            Some(RootField::Entity(producer)) => {
                producer.produce(&self.root_value, arguments).await
            }
            None => Ok(default_field_value(&self.root_value, field.name())),
        }
    }

    async fn resolve_field(
        &self,
        parent: &r::Value,
        field: &FieldInfo<'_>,
        arguments: &ArgumentValues,
    ) -> Result<Resolved, QueryExecutionError> {
        if let Some(TypeResolver::Override(resolver)) = self.types.get(field.type_name()) {
            match resolver.resolve(parent, field, arguments).await? {
                Resolution::Value(value) => return Ok(value.into()),
                Resolution::Partial(resolved) => return Ok(resolved),
                Resolution::Default => {}
            }
        }
        Ok(default_field_value(parent, field.name()).into())
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    overrides: Vec<(String, Arc<dyn ObjectResolver>)>,
    root_fields: IndexMap<String, RootField>,
}

impl RegistryBuilder {
    /// Route the fields of `type_name` through `resolver` first.
    pub fn with_override(
        mut self,
        type_name: impl Into<String>,
        resolver: Arc<dyn ObjectResolver>,
    ) -> Self {
        self.overrides.push((type_name.into(), resolver));
        self
    }

    pub fn with_root_field(mut self, name: impl Into<String>, field: RootField) -> Self {
        self.root_fields.insert(name.into(), field);
        self
    }

    /// Bind every object type of `schema` to its resolver. Fails if an
    /// override or root field names something the schema does not define.
    pub fn build(self, schema: &Schema) -> Result<ResolverRegistry, RegistryError> {
        let mut types: HashMap<String, TypeResolver> = schema
            .document
            .get_object_type_definitions()
            .into_iter()
            .map(|object_type| (object_type.name.clone(), TypeResolver::Default))
            .collect();

        for (type_name, resolver) in self.overrides {
            match types.get_mut(&type_name) {
                Some(entry) => *entry = TypeResolver::Override(resolver),
                None => return Err(RegistryError::UnknownType(type_name)),
            }
        }

        let query_type = schema.query_type();
        if let Some(name) = self
            .root_fields
            .keys()
            .find(|name| query_type.field(name).is_none())
        {
            return Err(RegistryError::UnknownRootField(name.clone()));
        }

        Ok(ResolverRegistry {
            types,
            root_fields: self.root_fields,
            root_value: r::Value::Object(r::Object::new()),
        })
    }
}
