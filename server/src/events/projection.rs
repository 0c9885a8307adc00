//! Wire-safe views of persisted users and events.
//!
//! Projections are pure: they read only what the row already holds and never
//! touch the database. An event whose joiners were not loaded projects with
//! an empty `joiners` list.

use serde::{Deserialize, Serialize};

use super::datetime::format_event_dt;
use crate::db::models::{Event, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPublic {
    pub id: i64,
    pub title: String,
    pub event_dt: Option<String>,
    pub duration: String,
    pub location: String,
    pub organizer_id: Option<i64>,
    pub joiners: Vec<UserPublic>,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

impl From<&Event> for EventPublic {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            event_dt: event.event_dt.as_ref().map(format_event_dt),
            duration: event.duration.clone(),
            location: event.location.clone(),
            organizer_id: event.organizer_id,
            joiners: event
                .joiners
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(UserPublic::from)
                .collect(),
        }
    }
}
