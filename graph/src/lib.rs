/// Traits and types for all system components.
pub mod components;

/// Common data types used throughout Quire.
pub mod data;

/// Logging utilities.
pub mod log;

/// Environment tuning knobs.
pub mod env;

pub mod cheap_clone;

mod task_spawn;

pub use task_spawn::{spawn, spawn_allow_panic};

pub use anyhow;
pub use graphql_parser;
pub use http;
pub use http_body_util;
pub use hyper;
pub use hyper_util;
pub use serde_json;
pub use slog;
pub use tokio;

/// A prelude that makes all system component traits and data types available.
///
/// Add the following code to import all traits and data types listed below at once.
///
/// ```
/// use quire::prelude::*;
/// ```
pub mod prelude {
    pub use ::anyhow;
    pub use anyhow::{anyhow, Context as _, Error};
    pub use async_trait::async_trait;
    pub use serde;
    pub use serde_derive::{Deserialize, Serialize};
    pub use serde_json;
    pub use slog::{self, crit, debug, error, info, o, trace, warn, Logger};
    pub use std::fmt::Debug;
    pub use std::sync::Arc;
    pub use std::time::Duration;
    pub use thiserror;
    pub use tokio;

    pub use crate::cheap_clone::CheapClone;
    pub use crate::components::graphql::GraphQlRunner;
    pub use crate::components::server::query::{GraphQLServerError, ServerResponse, ServerResult};
    pub use crate::components::store::{DatasetStore, StoreError};
    pub use crate::data::graphql::{DocumentExt, ObjectTypeExt, TypeExt};
    pub use crate::data::query::{
        PathSegment, Query, QueryError, QueryExecutionError, QueryResult, QueryVariables,
        ResponsePath,
    };
    pub use crate::data::schema::{FieldDescription, FieldShape, Schema, SchemaError, TypeDescription};
    pub use crate::data::store::{EntityType, Post, User};
    pub use crate::object;

    macro_rules! static_graphql {
        ($m:ident, $m2:ident, {$($n:ident,)*}) => {
            pub mod $m {
                use graphql_parser::$m2 as $m;
                pub use $m::*;
                $(
                    pub type $n = $m::$n<'static, String>;
                )*
            }
        };
    }

    // The query and schema ASTs are always owned, so pin their text type
    // to `String` once here instead of at every use site.
    static_graphql!(q, query, {
        Document, Value, OperationDefinition, InlineFragment, TypeCondition,
        FragmentSpread, Field, Selection, SelectionSet, FragmentDefinition,
        Directive, VariableDefinition, Type, Query, Definition,
    });
    static_graphql!(s, schema, {
        Field, Directive, ObjectType, Value, TypeDefinition, Definition,
        EnumType, Type, Document, ScalarType, InputValue, InterfaceType,
        SchemaDefinition,
    });

    pub mod r {
        pub use crate::data::value::{Object, Value};
    }
}
