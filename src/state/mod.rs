pub mod session;

use std::{sync::Arc, time::Instant};

use dashmap::DashMap;
use tokio::sync::{Mutex, OnceCell, RwLock, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::user_store::UserStore,
    error::ServiceError,
    oracle::OracleBackend,
    state::session::SessionState,
};

/// Shared handle to the central application state.
pub type SharedState = Arc<AppState>;

/// One row of a cached leaderboard snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// Display name with original casing.
    pub username: String,
    /// Accumulated experience points.
    pub xp: u64,
    /// Badge-qualifying inventory item ids.
    pub badges: Vec<String>,
}

/// A leaderboard snapshot together with the instant it was fetched.
#[derive(Debug, Clone)]
pub struct LeaderboardCache {
    /// Rows sorted by XP descending, ties stable in store order.
    pub rows: Vec<LeaderboardRow>,
    /// When the snapshot was built, for TTL checks.
    pub fetched_at: Instant,
}

/// Central application state storing the store handle, live sessions, and caches.
pub struct AppState {
    config: AppConfig,
    user_store: RwLock<Option<Arc<dyn UserStore>>>,
    degraded: watch::Sender<bool>,
    sessions: DashMap<Uuid, Arc<Mutex<SessionState>>>,
    write_gates: DashMap<String, Arc<Mutex<()>>>,
    leaderboard: RwLock<Option<LeaderboardCache>>,
    oracle: Option<Arc<dyn OracleBackend>>,
    oracle_model: OnceCell<String>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig, oracle: Option<Arc<dyn OracleBackend>>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            user_store: RwLock::new(None),
            degraded: degraded_tx,
            sessions: DashMap::new(),
            write_gates: DashMap::new(),
            leaderboard: RwLock::new(None),
            oracle,
            oracle_model: OnceCell::new(),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current user store, if one is installed.
    pub async fn user_store(&self) -> Option<Arc<dyn UserStore>> {
        let guard = self.user_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the user store or fail with the degraded-mode error.
    pub async fn require_user_store(&self) -> Result<Arc<dyn UserStore>, ServiceError> {
        self.user_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new user store implementation and leave degraded mode.
    pub async fn install_user_store(&self, store: Arc<dyn UserStore>) {
        {
            let mut guard = self.user_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current user store and enter degraded mode.
    pub async fn clear_user_store(&self) {
        {
            let mut guard = self.user_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.user_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Register a freshly logged-in session and hand back its identifier.
    pub fn register_session(&self, session: SessionState) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        id
    }

    /// Look up a live session by its identifier.
    pub fn session(&self, id: Uuid) -> Result<Arc<Mutex<SessionState>>, ServiceError> {
        self.sessions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ServiceError::NotFound(format!("session `{id}` not found")))
    }

    /// Discard a session at logout. Returns whether it existed.
    pub fn remove_session(&self, id: Uuid) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// Per-nickname gate serializing flushes so interleaved writes from the
    /// same process cannot trample each other. Writers in other processes
    /// still race; the last writer wins there.
    pub fn write_gate(&self, key: &str) -> Arc<Mutex<()>> {
        self.write_gates
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Slot holding the cached leaderboard snapshot.
    pub fn leaderboard_cache(&self) -> &RwLock<Option<LeaderboardCache>> {
        &self.leaderboard
    }

    /// Configured oracle backend, if a credential was provided.
    pub fn oracle(&self) -> Option<Arc<dyn OracleBackend>> {
        self.oracle.clone()
    }

    /// Process-lifetime cache for the selected oracle model.
    pub fn oracle_model(&self) -> &OnceCell<String> {
        &self.oracle_model
    }

    /// Update and broadcast the degraded flag when the value changes.
    async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current != value {
                *current = value;
                true
            } else {
                false
            }
        });
    }
}
