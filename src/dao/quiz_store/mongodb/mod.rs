mod config;
mod connection;
mod error;
mod models;
mod registry;
mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use registry::MongoStoreRegistry;
pub use store::MongoQuizStore;
