use std::sync::Arc;

use crate::config::Config;
use crate::sheets::TemplateCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Sheet templates, built and validated once at startup.
    pub templates: Arc<TemplateCatalog>,
}
