//! Joining and leaving events. Both mutations broadcast the refreshed event
//! as an `update` once the join-table change has committed.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::projection::EventPublic;
use super::store;
use crate::db::models::UserEventLink;
use crate::db::with_conn;
use crate::state::AppState;
use crate::ws::protocol::Notification;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MembershipRequest {
    pub event_id: i64,
    pub user_id: i64,
}

impl From<MembershipRequest> for UserEventLink {
    fn from(req: MembershipRequest) -> Self {
        Self {
            user_id: req.user_id,
            event_id: req.event_id,
        }
    }
}

/// POST /event/join/ — Add a user to an event's joiners.
pub async fn join_event(
    State(state): State<AppState>,
    Json(req): Json<MembershipRequest>,
) -> Result<Json<EventPublic>, (StatusCode, String)> {
    let link = UserEventLink::from(req);
    let event = with_conn(&state.db, move |conn| store::join_event(conn, link)).await?;
    let public = EventPublic::from(&event);

    tracing::info!(event_id = link.event_id, user_id = link.user_id, "User joined event");
    state.broadcaster.notify(&Notification::updated(public.clone()));

    Ok(Json(public))
}

/// POST /event/quit/ — Remove a user from an event's joiners.
pub async fn quit_event(
    State(state): State<AppState>,
    Json(req): Json<MembershipRequest>,
) -> Result<Json<EventPublic>, (StatusCode, String)> {
    let link = UserEventLink::from(req);
    let event = with_conn(&state.db, move |conn| store::quit_event(conn, link)).await?;
    let public = EventPublic::from(&event);

    tracing::info!(event_id = link.event_id, user_id = link.user_id, "User left event");
    state.broadcaster.notify(&Notification::updated(public.clone()));

    Ok(Json(public))
}
