mod resolver;

pub use self::resolver::{store_registry, PostResolver, UserResolver};
