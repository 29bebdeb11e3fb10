use indexmap::IndexMap;
use std::path::Path;

use graph::prelude::{DatasetStore, EntityType, Post, StoreError, User};

use crate::dataset::{check_references, index_by_id, Dataset, IntegrityViolation};

/// A dataset that lives in memory and never changes after it is built.
///
/// Records are kept in the order they were added, which is also the order
/// `list_users` and `list_posts` return them in. References between
/// records are not checked when the store is built; see [`validate`].
///
/// [`validate`]: MemoryStore::validate
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    users: IndexMap<String, User>,
    posts: IndexMap<String, Post>,
}

impl MemoryStore {
    pub fn new(users: Vec<User>, posts: Vec<Post>) -> Result<Self, StoreError> {
        Ok(MemoryStore {
            users: index_by_id(EntityType::User, users, |user| user.id.as_str())?,
            posts: index_by_id(EntityType::Post, posts, |post| post.id.as_str())?,
        })
    }

    /// The dataset served when no dataset file is configured.
    pub fn seeded() -> Self {
        let users = [
            User::new("1", "John Doe", "john@example.com", &["1", "2"]),
            User::new("2", "Jane Smith", "jane@example.com", &["3"]),
        ];
        let posts = [
            Post::new("1", "First Post", "This is the content of the first post.", "1"),
            Post::new("2", "Second Post", "This is the content of the second post.", "1"),
            Post::new("3", "Third Post", "This is the content of the third post.", "2"),
        ];

        MemoryStore {
            users: users.into_iter().map(|user| (user.id.clone(), user)).collect(),
            posts: posts.into_iter().map(|post| (post.id.clone(), post)).collect(),
        }
    }

    /// Build a store from the JSON text of a dataset file.
    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        let dataset: Dataset = serde_json::from_str(text)?;
        Self::new(dataset.users, dataset.posts)
    }

    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Io(path.display().to_string(), e))?;
        Self::from_json(&text)
    }

    /// Every reference between records that does not resolve, or that
    /// disagrees with the reference in the other direction.
    pub fn validate(&self) -> Vec<IntegrityViolation> {
        check_references(&self.users, &self.posts)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }
}

impl DatasetStore for MemoryStore {
    fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(id).cloned())
    }

    fn get_post(&self, id: &str) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.get(id).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.values().cloned().collect())
    }

    fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        Ok(self.posts.values().cloned().collect())
    }
}
