use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::TokenVerifier;
use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::db::Database;
use crate::handlers::{events, health_check};
use crate::services::EventService;

#[derive(Clone)]
pub struct AppState {
    pub events: Arc<EventService>,
    pub verifier: TokenVerifier,
}

impl AppState {
    pub fn new(db: Database, jwt_secret: &str) -> Self {
        Self {
            events: Arc::new(EventService::new(db)),
            verifier: TokenVerifier::new(jwt_secret),
        }
    }
}

impl FromRef<AppState> for TokenVerifier {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

pub fn create_routes(state: AppState) -> Router {
    let event_routes = Router::new()
        .route("/create", post(events::create_event))
        .route("/", get(events::list_events))
        .route("/my-events", get(events::my_events))
        .route("/:id", get(events::get_event).put(events::update_event))
        .route("/:id/participate", post(events::participate))
        .route("/:id/participants", get(events::get_participants));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/events", event_routes)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
