//! HTTP surface for USSD gateways.
//!
//! `POST /ussd` takes the gateway's form fields and answers with a plain-text
//! `CON ...` or `END ...` body. `GET /health` is a liveness probe.

use crate::application::engine::{UssdEngine, UssdRequest, UssdResponse};
use crate::application::locale::Strings;
use crate::domain::session::Language;
use axum::{
    Form, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<UssdEngine>,
}

impl AppState {
    pub fn new(engine: UssdEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UssdForm {
    pub session_id: String,
    pub phone_number: String,
    #[serde(default)]
    pub text: String,
    /// PIN already collected by an upstream menu.
    #[serde(default)]
    pub pin: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl From<UssdForm> for UssdRequest {
    fn from(form: UssdForm) -> Self {
        UssdRequest::new(form.session_id, form.phone_number, form.text).with_handoff(
            form.pin.filter(|p| !p.is_empty()),
            form.language
                .filter(|l| !l.is_empty())
                .map(|l| Language::from_tag(&l)),
        )
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ussd", post(handle_ussd))
        .route("/health", get(health))
        .with_state(state)
}

async fn handle_ussd(State(state): State<AppState>, Form(form): Form<UssdForm>) -> String {
    let session_id = form.session_id.clone();
    match state.engine.handle(form.into()).await {
        Ok(response) => response.to_string(),
        Err(e) => {
            error!(%session_id, error = %e, "USSD request failed");
            UssdResponse::End(Strings::new(Language::En).generic_error().to_string()).to_string()
        }
    }
}

async fn health() -> &'static str {
    "ok"
}
