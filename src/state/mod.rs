pub mod session;
pub mod state_machine;

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock, mpsc, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::quiz_store::{QuizStore, QuizStoreProvider},
    error::ServiceError,
};

pub use self::session::{ConnectionId, Participant, SessionContext, SessionSlot};
pub use self::state_machine::{SessionEvent, SessionPhase, SessionStateMachine};

/// Shared handle to the central application state.
pub type SharedState = Arc<AppState>;

/// Handle used to push messages to one connected realtime client.
#[derive(Clone)]
pub struct PlayerConnection {
    /// Connection identifier assigned at upgrade time.
    pub id: ConnectionId,
    /// Outbound channel drained by the connection's writer task.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state storing the session slot, realtime connections,
/// and the per-owner storage registry.
pub struct AppState {
    config: AppConfig,
    stores: RwLock<Option<Arc<dyn QuizStoreProvider>>>,
    connections: DashMap<ConnectionId, PlayerConnection>,
    session: Mutex<SessionSlot>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage provider is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            stores: RwLock::new(None),
            connections: DashMap::new(),
            session: Mutex::new(SessionSlot::new()),
            degraded: degraded_tx,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current store provider, if one is installed.
    pub async fn stores(&self) -> Option<Arc<dyn QuizStoreProvider>> {
        let guard = self.stores.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the store provider or fail with a degraded-mode error.
    pub async fn require_stores(&self) -> Result<Arc<dyn QuizStoreProvider>, ServiceError> {
        self.stores().await.ok_or(ServiceError::Degraded)
    }

    /// Obtain the durable store scoped to `owner_id`.
    pub async fn store_for_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Arc<dyn QuizStore>, ServiceError> {
        let provider = self.require_stores().await?;
        provider.store_for(owner_id).await.map_err(Into::into)
    }

    /// Install a new store provider and leave degraded mode.
    pub async fn install_stores(&self, provider: Arc<dyn QuizStoreProvider>) {
        {
            let mut guard = self.stores.write().await;
            *guard = Some(provider);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current store provider and enter degraded mode.
    pub async fn clear_stores(&self) {
        {
            let mut guard = self.stores.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.stores.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Registry of live realtime connections keyed by their identifier.
    ///
    /// Holds every socket, participant or viewer; broadcasts go to all of
    /// them by design of the single-session model.
    pub fn connections(&self) -> &DashMap<ConnectionId, PlayerConnection> {
        &self.connections
    }

    /// The global session slot.
    ///
    /// Handlers hold this lock for their whole body, including persistence
    /// awaits, so mutations never interleave.
    pub fn session(&self) -> &Mutex<SessionSlot> {
        &self.session
    }

    /// Snapshot the current phase of the session slot.
    pub async fn session_phase(&self) -> SessionPhase {
        self.session.lock().await.phase()
    }

    /// Update and broadcast the degraded flag when the value changes.
    async fn update_degraded(&self, value: bool) {
        if self.is_degraded().await == value {
            return;
        }

        let _ = self.degraded.send(value);
    }
}
