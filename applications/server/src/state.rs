/// Shared application state
use crate::services::SessionService;
use atelier_store::ObjectStore;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub sessions: Arc<SessionService>,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>, sessions: Arc<SessionService>) -> Self {
        Self { store, sessions }
    }
}
