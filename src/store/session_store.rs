// src/store/session_store.rs
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::storage::KeyValueStorage,
    models::session::AuthUser,
    store::error::{LoadOutcome, StoreError},
};

#[derive(Default)]
struct SessionState {
    user: Option<AuthUser>,
    is_loaded: bool,
}

/// At most one signed-in identity at a time, persisted so a restart comes
/// back signed in. There is no credential check and no expiry; presence of
/// the record is the whole state machine.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    state: RwLock<SessionState>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &self.key)
            .finish()
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Attempts to restore the persisted session. Absent or unreadable data
    /// leaves the session empty; the failure is logged, not surfaced. Marks
    /// the store loaded either way.
    pub async fn restore(&self) -> LoadOutcome {
        let mut state = self.state.write().await;
        let outcome = match self.storage.get(&self.key).await {
            Ok(Some(raw)) => match serde_json::from_str::<AuthUser>(&raw) {
                Ok(user) => {
                    state.user = Some(user);
                    LoadOutcome::Loaded(1)
                }
                Err(err) => {
                    tracing::warn!("session record failed to parse, starting signed out: {err}");
                    state.user = None;
                    LoadOutcome::Recovered
                }
            },
            Ok(None) => {
                state.user = None;
                LoadOutcome::Empty
            }
            Err(err) => {
                tracing::warn!("session record unreadable, starting signed out: {err}");
                state.user = None;
                LoadOutcome::Recovered
            }
        };
        state.is_loaded = true;
        outcome
    }

    /// Persists the identity and makes it the resident session. Persist
    /// happens first, so a failed write leaves the previous session active.
    pub async fn login(&self, user: AuthUser) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let blob = serde_json::to_string(&user)?;
        self.storage.set(&self.key, &blob).await?;
        tracing::info!(user_id = %user.id, role = ?user.role, "user signed in");
        state.user = Some(user);
        Ok(())
    }

    /// Removes the persisted entry and clears the resident session.
    pub async fn logout(&self) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        self.storage.remove(&self.key).await?;
        state.user = None;
        tracing::info!("user signed out");
        Ok(())
    }

    /// Snapshot of the resident session, if any.
    pub async fn current_user(&self) -> Option<AuthUser> {
        self.state.read().await.user.clone()
    }

    /// True once the startup restore attempt (successful or not) has run.
    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.is_loaded
    }
}
