// Event HTTP handlers: extract, delegate to the service, wrap the result.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::routes::AppState;
use crate::services::EventFilter;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

/// Body for create and update. `title` and `date` are mandatory; the
/// optional fields overwrite whatever was stored before.
#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub q: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// POST /api/events/create
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<EventInput>,
) -> Result<Response, AppError> {
    let id = state.events.create(user.id, input).await?;
    tracing::info!(event_id = %id, organizer_id = %user.id, "Event created");

    Ok(created("Event created successfully").into_response())
}

/// GET /api/events?q=&startDate=&endDate=
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let filter = EventFilter::from_params(params.q, params.start_date, params.end_date)?;
    let events = state.events.list(filter).await?;

    Ok(success(events, "Events fetched successfully").into_response())
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.events.get(id).await?;

    Ok(success(event, "Event fetched successfully").into_response())
}

/// POST /api/events/:id/participate
pub async fn participate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.events.participate(id, user.id).await?;

    Ok(empty_success("Successfully participated in the event!").into_response())
}

/// GET /api/events/my-events
pub async fn my_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    let events = state.events.list_mine(user.id).await?;

    Ok(success(events, "Your events fetched successfully").into_response())
}

/// PUT /api/events/:id
pub async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<EventInput>,
) -> Result<Response, AppError> {
    let event = state.events.update(id, user.id, input).await?;

    Ok(success(event, "Event updated successfully").into_response())
}

/// GET /api/events/:id/participants
pub async fn get_participants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let participants = state.events.participants(id).await?;

    Ok(success(participants, "Participants fetched successfully").into_response())
}
