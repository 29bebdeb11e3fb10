use serde_derive::{Deserialize, Serialize};
use std::fmt;

use crate::object;
use crate::prelude::r;

/// The kinds of records held in the dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityType {
    User,
    Post,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "User",
            EntityType::Post => "Post",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user. `posts` lists the ids of the user's posts in display order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub posts: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
}

impl User {
    pub fn new(id: &str, name: &str, email: &str, posts: &[&str]) -> Self {
        User {
            id: id.to_owned(),
            name: name.to_owned(),
            email: email.to_owned(),
            posts: posts.iter().map(|id| id.to_string()).collect(),
        }
    }
}

impl Post {
    pub fn new(id: &str, title: &str, content: &str, author_id: &str) -> Self {
        Post {
            id: id.to_owned(),
            title: title.to_owned(),
            content: content.to_owned(),
            author_id: author_id.to_owned(),
        }
    }
}

/// Records become objects keyed by their stored field names, so that the
/// default resolver can read them directly.
impl From<User> for r::Value {
    fn from(user: User) -> Self {
        object! {
            id: user.id,
            name: user.name,
            email: user.email,
            posts: user.posts,
        }
    }
}

impl From<Post> for r::Value {
    fn from(post: Post) -> Self {
        object! {
            id: post.id,
            title: post.title,
            content: post.content,
            authorId: post.author_id,
        }
    }
}
