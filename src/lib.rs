//! Ticket lifecycle and local persistence core of the CampusFix campus
//! maintenance app. Students and staff raise tickets for electrical,
//! plumbing and carpentry issues; the maintenance head assigns workers and
//! closes them. Screens render from the two stores here and call their
//! operations; each mutation persists the whole collection to the local
//! key-value medium before it is considered durable.

pub mod config;
pub mod db;
pub mod dtos;
pub mod models;
pub mod store;
pub mod utils;

use std::sync::Arc;

use config::Config;
use db::storage::{FileStorage, KeyValueStorage};
use dotenv::dotenv;
use store::error::LoadOutcome;
use store::session_store::SessionStore;
use store::ticket_store::TicketStore;
use tracing_subscriber::filter::LevelFilter;

/// Everything a UI layer needs, constructed once at process start and passed
/// by handle to consumers. No hidden globals.
#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub ticket_store: Arc<TicketStore>,
    pub session_store: Arc<SessionStore>,
}

impl AppState {
    /// Wires both stores onto a shared storage medium.
    pub fn new(storage: Arc<dyn KeyValueStorage>, env: Config) -> Self {
        let ticket_store = Arc::new(TicketStore::new(storage.clone(), env.tickets_key.clone()));
        let session_store = Arc::new(SessionStore::new(storage, env.session_key.clone()));
        AppState {
            env,
            ticket_store,
            session_store,
        }
    }

    /// Convenience constructor for the production setup: environment config
    /// over file-backed storage in the configured data directory.
    pub fn from_env() -> Self {
        dotenv().ok();
        let env = Config::init();
        let storage = Arc::new(FileStorage::new(env.data_dir.clone()));
        Self::new(storage, env)
    }

    /// Startup load of both stores. Failures are swallowed into empty state
    /// per store policy; the outcomes are logged and returned so callers can
    /// tell "no data yet" from "data lost".
    pub async fn bootstrap(&self) -> (LoadOutcome, LoadOutcome) {
        let session = self.session_store.restore().await;
        let tickets = self.ticket_store.load().await;
        tracing::info!(session = ?session, tickets = ?tickets, "stores loaded");
        (session, tickets)
    }
}

/// Tracing setup for apps embedding the core. Call once at startup.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();
}
