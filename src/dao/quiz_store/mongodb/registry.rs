use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use mongodb::{Client, bson::doc};
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    store::{MongoQuizStore, ensure_indexes},
};
use crate::dao::{
    quiz_store::{QuizStore, QuizStoreProvider},
    storage::StorageResult,
};

/// Per-owner store registry backed by a single shared MongoDB client.
///
/// Each owner gets a dedicated database named `<prefix>_<owner-id>`; its
/// store is opened lazily on first use and cached for the process lifetime.
#[derive(Clone)]
pub struct MongoStoreRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    client: Client,
    database_prefix: String,
    stores: DashMap<Uuid, Arc<dyn QuizStore>>,
}

impl MongoStoreRegistry {
    /// Establish the shared connection behind the registry.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let client = establish_connection(&config.options).await?;

        Ok(Self {
            inner: Arc::new(RegistryInner {
                client,
                database_prefix: config.database_prefix,
                stores: DashMap::new(),
            }),
        })
    }

    /// Ping the shared connection.
    pub async fn ping(&self) -> MongoResult<()> {
        self.inner
            .client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    fn database_name(&self, owner_id: Uuid) -> String {
        format!("{}_{}", self.inner.database_prefix, owner_id.simple())
    }

    async fn open_store(&self, owner_id: Uuid) -> MongoResult<Arc<dyn QuizStore>> {
        if let Some(store) = self.inner.stores.get(&owner_id) {
            return Ok(store.value().clone());
        }

        let database = self.inner.client.database(&self.database_name(owner_id));
        ensure_indexes(&database).await?;

        let store: Arc<dyn QuizStore> = Arc::new(MongoQuizStore::new(database));
        // A concurrent opener may have won the race; keep whichever landed first.
        let entry = self
            .inner
            .stores
            .entry(owner_id)
            .or_insert_with(|| store.clone());
        Ok(entry.value().clone())
    }
}

impl QuizStoreProvider for MongoStoreRegistry {
    fn store_for(&self, owner_id: Uuid) -> BoxFuture<'static, StorageResult<Arc<dyn QuizStore>>> {
        let registry = self.clone();
        Box::pin(async move { registry.open_store(owner_id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let registry = self.clone();
        Box::pin(async move { registry.ping().await.map_err(Into::into) })
    }
}
