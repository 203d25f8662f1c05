mod config;
mod errors;
mod routes;
mod sheets;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::sheets::template::SheetKind;
use crate::sheets::TemplateCatalog;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Labelsheet API v{}", env!("CARGO_PKG_VERSION"));

    // Sheet templates are fixed per process; a bad template is a startup error.
    let templates = TemplateCatalog::standard()?;
    for kind in [SheetKind::Label, SheetKind::Companion] {
        let t = templates.template(kind);
        info!(
            "Template {:?}: {} ({}x{} cells on {}in x {}in, {} {}pt)",
            kind,
            t.name,
            t.num_rows,
            t.num_cols,
            t.width_in,
            t.height_in,
            t.font.family.base_font_name(t.font.bold),
            t.font.size_pt
        );
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        templates: Arc::new(templates),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
