use std::sync::Arc;

use crate::editor::session::SessionRegistry;
use crate::editor::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, in-memory when no DATABASE_URL is set.
    pub store: Arc<dyn ResumeStore>,
    /// One editor session per open résumé.
    pub sessions: SessionRegistry,
}
