use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

/// Default prefix for per-owner database names.
const DEFAULT_DATABASE_PREFIX: &str = "quizcraft_host";

/// Connection settings for the MongoDB quiz store registry.
#[derive(Clone)]
pub struct MongoConfig {
    /// Parsed client options shared by every per-owner database.
    pub options: ClientOptions,
    /// Prefix used to derive per-owner database names.
    pub database_prefix: String,
}

impl MongoConfig {
    /// Parse a connection URI into a registry configuration.
    pub async fn from_uri(uri: &str, database_prefix: Option<&str>) -> MongoResult<Self> {
        let database_prefix = database_prefix.unwrap_or(DEFAULT_DATABASE_PREFIX).to_owned();
        let options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;

        Ok(Self {
            options,
            database_prefix,
        })
    }
}
