use graph::log::LogCode;
use graph::prelude::*;

use crate::execution::{ArgumentValues, FieldInfo, Resolved};
use crate::registry::{
    EntityProducer, ListProducer, ObjectResolver, RegistryError, Resolution, ResolverRegistry,
    RootField,
};

/// How relationship fields treat references to records that don't exist.
#[derive(Clone)]
struct References {
    logger: Logger,
    strict: bool,
}

impl References {
    /// A reference at `path` from `field` to the missing `entity_type`
    /// record `id`. The reference resolves to `null` either way; strict mode
    /// also reports it as an error, otherwise it is only logged.
    fn missing(
        &self,
        field: &FieldInfo<'_>,
        path: &ResponsePath,
        entity_type: EntityType,
        id: &str,
    ) -> Option<QueryExecutionError> {
        if self.strict {
            return Some(QueryExecutionError::DanglingReference(
                field.position(),
                entity_type.to_string(),
                id.to_owned(),
            ));
        }
        warn!(self.logger, "Reference to missing record";
              "type" => entity_type.as_str(),
              "id" => id,
              "field" => format!("{}.{}", field.type_name(), field.name()),
              "path" => path.to_string(),
              "code" => LogCode::DanglingReference);
        None
    }
}

/// Resolves `User.posts` by looking up each of the user's post ids.
pub struct UserResolver {
    store: Arc<dyn DatasetStore>,
    references: References,
}

#[async_trait]
impl ObjectResolver for UserResolver {
    async fn resolve(
        &self,
        parent: &r::Value,
        field: &FieldInfo<'_>,
        _: &ArgumentValues,
    ) -> Result<Resolution, QueryExecutionError> {
        if field.name() != "posts" {
            return Ok(Resolution::Default);
        }

        let ids = match parent.as_object().and_then(|user| user.get("posts")) {
            Some(r::Value::List(ids)) => ids,
            _ => return Ok(Resolution::Value(r::Value::Null)),
        };

        // A missing post only nulls its own element of the list
        let mut posts = Vec::with_capacity(ids.len());
        let mut errors = Vec::new();
        for (index, id) in ids.iter().filter_map(r::Value::as_str).enumerate() {
            let post = match self.store.get_post(id)? {
                Some(post) => post.into(),
                None => {
                    let path = field.path.index(index);
                    if let Some(e) = self.references.missing(field, &path, EntityType::Post, id) {
                        errors.push((path, e));
                    }
                    r::Value::Null
                }
            };
            posts.push(post);
        }

        let value = r::Value::List(posts);
        if errors.is_empty() {
            Ok(Resolution::Value(value))
        } else {
            Ok(Resolution::Partial(Resolved { value, errors }))
        }
    }
}

/// Resolves `Post.author` by looking up the post's `authorId`.
pub struct PostResolver {
    store: Arc<dyn DatasetStore>,
    references: References,
}

#[async_trait]
impl ObjectResolver for PostResolver {
    async fn resolve(
        &self,
        parent: &r::Value,
        field: &FieldInfo<'_>,
        _: &ArgumentValues,
    ) -> Result<Resolution, QueryExecutionError> {
        if field.name() != "author" {
            return Ok(Resolution::Default);
        }

        let author_id = match parent
            .as_object()
            .and_then(|post| post.get("authorId"))
            .and_then(r::Value::as_str)
        {
            Some(id) => id,
            None => return Ok(Resolution::Value(r::Value::Null)),
        };

        let author = match self.store.get_user(author_id)? {
            Some(user) => user.into(),
            None => {
                if let Some(e) =
                    self.references
                        .missing(field, field.path, EntityType::User, author_id)
                {
                    return Err(e);
                }
                r::Value::Null
            }
        };
        Ok(Resolution::Value(author))
    }
}

pub struct UsersProducer(Arc<dyn DatasetStore>);

#[async_trait]
impl ListProducer for UsersProducer {
    async fn produce(&self) -> Result<Vec<r::Value>, QueryExecutionError> {
        Ok(self.0.list_users()?.into_iter().map(r::Value::from).collect())
    }
}

pub struct PostsProducer(Arc<dyn DatasetStore>);

#[async_trait]
impl ListProducer for PostsProducer {
    async fn produce(&self) -> Result<Vec<r::Value>, QueryExecutionError> {
        Ok(self.0.list_posts()?.into_iter().map(r::Value::from).collect())
    }
}

fn id_argument(arguments: &ArgumentValues) -> Option<&str> {
    arguments.get("id").and_then(r::Value::as_str)
}

pub struct UserById(Arc<dyn DatasetStore>);

#[async_trait]
impl EntityProducer for UserById {
    async fn produce(
        &self,
        _: &r::Value,
        arguments: &ArgumentValues,
    ) -> Result<r::Value, QueryExecutionError> {
        let user = match id_argument(arguments) {
            Some(id) => self.0.get_user(id)?,
            None => None,
        };
        Ok(user.map_or(r::Value::Null, r::Value::from))
    }
}

pub struct PostById(Arc<dyn DatasetStore>);

#[async_trait]
impl EntityProducer for PostById {
    async fn produce(
        &self,
        _: &r::Value,
        arguments: &ArgumentValues,
    ) -> Result<r::Value, QueryExecutionError> {
        let post = match id_argument(arguments) {
            Some(id) => self.0.get_post(id)?,
            None => None,
        };
        Ok(post.map_or(r::Value::Null, r::Value::from))
    }
}

/// The registry that serves the blog schema from `store`: overrides for
/// the `User.posts` and `Post.author` relationships and producers for the
/// `users`, `user`, `posts` and `post` root fields.
pub fn store_registry(
    logger: &Logger,
    store: Arc<dyn DatasetStore>,
    schema: &Schema,
    strict_references: bool,
) -> Result<ResolverRegistry, RegistryError> {
    let references = References {
        logger: logger.new(o!("component" => "StoreResolver")),
        strict: strict_references,
    };

    ResolverRegistry::builder()
        .with_override(
            EntityType::User.as_str(),
            Arc::new(UserResolver {
                store: store.cheap_clone(),
                references: references.clone(),
            }),
        )
        .with_override(
            EntityType::Post.as_str(),
            Arc::new(PostResolver {
                store: store.cheap_clone(),
                references,
            }),
        )
        .with_root_field(
            "users",
            RootField::List(Arc::new(UsersProducer(store.cheap_clone()))),
        )
        .with_root_field(
            "user",
            RootField::Entity(Arc::new(UserById(store.cheap_clone()))),
        )
        .with_root_field(
            "posts",
            RootField::List(Arc::new(PostsProducer(store.cheap_clone()))),
        )
        .with_root_field("post", RootField::Entity(Arc::new(PostById(store))))
        .build(schema)
}
