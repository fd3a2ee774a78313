// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Host application served by `rzl serve`.
//!
//! `/` renders `index.html` from the templates directory with the Vite
//! globals available; everything else is static files.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use rizzler::lifespan::static_routes;
use rizzler::{RizzleTemplates, RizzlerConfig};
use tera::Context;
use tokio::sync::RwLock;

/// Shared application state for the host app.
pub struct AppState {
    /// Templates with the Vite globals registered.
    pub templates: RwLock<RizzleTemplates>,
    /// Page title passed to templates.
    pub title: String,
}

impl AppState {
    /// Creates the state around loaded templates.
    pub fn new(templates: RizzleTemplates, title: impl Into<String>) -> Self {
        Self {
            templates: RwLock::new(templates),
            title: title.into(),
        }
    }
}

/// Builds the host application router around `templates`.
///
/// Returns the shared state too, so callers can reload the templates.
pub fn create_app(templates: RizzleTemplates, config: &RizzlerConfig) -> (Router, Arc<AppState>) {
    let statics = static_routes::<Arc<AppState>>(config, templates.mode());
    let state = Arc::new(AppState::new(templates, config.dev.title.clone()));

    let app = Router::new()
        .route("/", get(index))
        .merge(statics)
        .with_state(state.clone());
    (app, state)
}

async fn index(State(state): State<Arc<AppState>>) -> Response {
    let mut context = Context::new();
    context.insert("title", &state.title);

    let templates = state.templates.read().await;
    match templates.render("index.html", &context) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            tracing::error!("Failed to render index.html: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {}", err)).into_response()
        }
    }
}
