use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::datetime;
use super::projection::EventPublic;
use super::store::{self, NewEvent};
use crate::db::with_conn;
use crate::pagination::Pagination;
use crate::state::AppState;
use crate::ws::protocol::Notification;

// --- Request types ---

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default, deserialize_with = "datetime::deserialize_opt")]
    pub event_dt: Option<NaiveDateTime>,
    pub duration: String,
    pub location: String,
    #[serde(default)]
    pub organizer_id: Option<i64>,
}

impl CreateEventRequest {
    fn into_new_event(self) -> Result<NewEvent, (StatusCode, String)> {
        for (field, value) in [
            ("title", &self.title),
            ("duration", &self.duration),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err((
                    StatusCode::BAD_REQUEST,
                    format!("Event {} cannot be empty", field),
                ));
            }
        }
        Ok(NewEvent {
            title: self.title,
            event_dt: self.event_dt,
            duration: self.duration,
            location: self.location,
            organizer_id: self.organizer_id,
        })
    }
}

// --- Handlers ---

/// GET / and GET /events/ — List events with their joiners.
pub async fn list_events(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<EventPublic>>, (StatusCode, String)> {
    let page = page.validate()?;
    let events = with_conn(&state.db, move |conn| {
        store::list_events(conn, page.offset, page.limit)
    })
    .await?;

    Ok(Json(events.iter().map(EventPublic::from).collect()))
}

/// GET /event/{id} — Fetch one event with its joiners.
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<EventPublic>, (StatusCode, String)> {
    let event = with_conn(&state.db, move |conn| store::get_event(conn, event_id)).await?;
    Ok(Json(EventPublic::from(&event)))
}

/// POST /event/ — Create an event and announce it to live clients.
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<EventPublic>, (StatusCode, String)> {
    let new_event = req.into_new_event()?;

    let event = with_conn(&state.db, move |conn| store::insert_event(conn, &new_event)).await?;
    let public = EventPublic::from(&event);

    tracing::info!(event_id = public.id, title = %public.title, "Event created");
    state.broadcaster.notify(&Notification::created(public.clone()));

    Ok(Json(public))
}

/// DELETE /event/cancel/{id} — Cancel (delete) an event.
/// Live clients receive only the id of the removed event.
pub async fn cancel_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    with_conn(&state.db, move |conn| store::delete_event(conn, event_id)).await?;

    tracing::info!(event_id, "Event cancelled");
    state.broadcaster.notify(&Notification::deleted(event_id));

    Ok(Json(serde_json::json!({ "ok": true })))
}
