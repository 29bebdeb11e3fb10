mod request;
mod server;
mod service;

pub use self::server::GraphQLServer;
pub use self::service::GraphQLService;

pub mod test_utils;
