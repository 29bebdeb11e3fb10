use indexmap::IndexMap;
use serde_derive::Deserialize;
use thiserror::Error;

use graph::prelude::{EntityType, Post, StoreError, User};

/// The contents of a dataset file: `{"users": [...], "posts": [...]}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Dataset {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// A reference between records that does not hold up.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IntegrityViolation {
    #[error("User `{user}` lists post `{post}`, which does not exist")]
    MissingPost { user: String, post: String },
    #[error("Post `{post}` has author `{author}`, who does not exist")]
    MissingAuthor { post: String, author: String },
    #[error("User `{user}` lists post `{post}`, but its author is `{author}`")]
    ForeignPost {
        user: String,
        post: String,
        author: String,
    },
}

/// Index `records` by id, keeping their order. Fails on the first id that
/// appears twice.
pub(crate) fn index_by_id<T>(
    entity_type: EntityType,
    records: Vec<T>,
    id: impl Fn(&T) -> &str,
) -> Result<IndexMap<String, T>, StoreError> {
    let mut map = IndexMap::with_capacity(records.len());
    for record in records {
        let key = id(&record).to_owned();
        if map.contains_key(&key) {
            return Err(StoreError::DuplicateId(entity_type, key));
        }
        map.insert(key, record);
    }
    Ok(map)
}

pub(crate) fn check_references(
    users: &IndexMap<String, User>,
    posts: &IndexMap<String, Post>,
) -> Vec<IntegrityViolation> {
    let mut violations = Vec::new();

    for user in users.values() {
        for post_id in &user.posts {
            match posts.get(post_id) {
                None => violations.push(IntegrityViolation::MissingPost {
                    user: user.id.clone(),
                    post: post_id.clone(),
                }),
                Some(post) if post.author_id != user.id => {
                    violations.push(IntegrityViolation::ForeignPost {
                        user: user.id.clone(),
                        post: post_id.clone(),
                        author: post.author_id.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    for post in posts.values() {
        if !users.contains_key(&post.author_id) {
            violations.push(IntegrityViolation::MissingAuthor {
                post: post.id.clone(),
                author: post.author_id.clone(),
            });
        }
    }

    violations
}
