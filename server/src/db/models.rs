//! Database row types for all tables.
//! These correspond 1:1 to the SQLite schema defined in migrations.rs.

use chrono::NaiveDateTime;

/// User record in the users table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
}

/// Event record in the events table.
///
/// `joiners` is `None` when the relationship has not been loaded from
/// `user_event_link`; projections treat that the same as an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub event_dt: Option<NaiveDateTime>,
    pub duration: String,
    pub location: String,
    pub organizer_id: Option<i64>,
    pub joiners: Option<Vec<User>>,
}

/// Row in the user/event join table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserEventLink {
    pub user_id: i64,
    pub event_id: i64,
}
