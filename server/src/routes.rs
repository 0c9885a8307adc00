use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::events::{crud as event_crud, membership};
use crate::state::AppState;
use crate::users::crud as user_crud;
use crate::ws::handler as ws_handler;

/// Build the full axum Router with all routes.
pub fn build_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route(
            "/users/",
            get(user_crud::list_users).post(user_crud::create_user),
        )
        .route("/users/{id}", get(user_crud::get_user));

    // The event list is served at both `/` and `/events/`; creation accepts
    // both `/event/` and `/events/`.
    let event_routes = Router::new()
        .route("/", get(event_crud::list_events))
        .route(
            "/events/",
            get(event_crud::list_events).post(event_crud::create_event),
        )
        .route("/event/", post(event_crud::create_event))
        .route("/event/join/", post(membership::join_event))
        .route("/event/quit/", post(membership::quit_event))
        .route("/event/cancel/{id}", delete(event_crud::cancel_event))
        .route("/event/{id}", get(event_crud::get_event));

    // WebSocket endpoint for live updates
    let ws_routes = Router::new().route("/ws", get(ws_handler::ws_upgrade));

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(user_routes)
        .merge(event_routes)
        .merge(ws_routes)
        .merge(health)
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
