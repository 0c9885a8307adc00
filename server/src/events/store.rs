use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::datetime::{format_event_dt, EVENT_DT_FORMAT};
use crate::db::models::{Event, User, UserEventLink};
use crate::db::StoreError;
use crate::users::store::get_user;

/// Fields supplied when creating an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub event_dt: Option<NaiveDateTime>,
    pub duration: String,
    pub location: String,
    pub organizer_id: Option<i64>,
}

const EVENT_COLUMNS: &str = "id, title, event_dt, duration, location, organizer_id";

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let event_dt = match row.get::<_, Option<String>>(2)? {
        Some(raw) => Some(
            NaiveDateTime::parse_from_str(&raw, EVENT_DT_FORMAT).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
            })?,
        ),
        None => None,
    };
    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        event_dt,
        duration: row.get(3)?,
        location: row.get(4)?,
        organizer_id: row.get(5)?,
        joiners: None,
    })
}

pub fn insert_event(conn: &Connection, new: &NewEvent) -> Result<Event, StoreError> {
    conn.execute(
        "INSERT INTO events (title, event_dt, duration, location, organizer_id) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new.title,
            new.event_dt.as_ref().map(format_event_dt),
            new.duration,
            new.location,
            new.organizer_id,
        ],
    )?;

    Ok(Event {
        id: conn.last_insert_rowid(),
        title: new.title.clone(),
        event_dt: new.event_dt,
        duration: new.duration.clone(),
        location: new.location.clone(),
        organizer_id: new.organizer_id,
        joiners: Some(Vec::new()),
    })
}

/// Users who joined `event_id`, in join-table order.
pub fn load_joiners(conn: &Connection, event_id: i64) -> Result<Vec<User>, StoreError> {
    let mut stmt = conn.prepare_cached(
        "SELECT u.id, u.name FROM user_event_link l
         JOIN users u ON u.id = l.user_id
         WHERE l.event_id = ?1
         ORDER BY l.rowid ASC",
    )?;
    let joiners = stmt
        .query_map([event_id], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(joiners)
}

/// Fetch one event with its joiners loaded.
pub fn get_event(conn: &Connection, event_id: i64) -> Result<Event, StoreError> {
    let mut event = conn
        .query_row(
            &format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS),
            [event_id],
            event_from_row,
        )
        .optional()?
        .ok_or(StoreError::NotFound("Event"))?;
    event.joiners = Some(load_joiners(conn, event_id)?);
    Ok(event)
}

/// Page through events by id, each with its joiners loaded.
pub fn list_events(conn: &Connection, offset: i64, limit: i64) -> Result<Vec<Event>, StoreError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM events ORDER BY id ASC LIMIT ?1 OFFSET ?2",
        EVENT_COLUMNS
    ))?;
    let mut events = stmt
        .query_map([limit, offset], event_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for event in &mut events {
        event.joiners = Some(load_joiners(conn, event.id)?);
    }
    Ok(events)
}

/// Add a user to an event's joiners. Joining twice leaves a single link.
pub fn join_event(conn: &mut Connection, link: UserEventLink) -> Result<Event, StoreError> {
    let tx = conn.transaction()?;
    ensure_event_exists(&tx, link.event_id)?;
    get_user(&tx, link.user_id)?;

    tx.execute(
        "INSERT OR IGNORE INTO user_event_link (user_id, event_id) VALUES (?1, ?2)",
        params![link.user_id, link.event_id],
    )?;
    let event = get_event(&tx, link.event_id)?;
    tx.commit()?;
    Ok(event)
}

/// Remove a user from an event's joiners.
pub fn quit_event(conn: &mut Connection, link: UserEventLink) -> Result<Event, StoreError> {
    let tx = conn.transaction()?;
    ensure_event_exists(&tx, link.event_id)?;
    get_user(&tx, link.user_id)?;

    let removed = tx.execute(
        "DELETE FROM user_event_link WHERE user_id = ?1 AND event_id = ?2",
        params![link.user_id, link.event_id],
    )?;
    if removed == 0 {
        return Err(StoreError::Invalid(
            "User has not joined this event".to_string(),
        ));
    }
    let event = get_event(&tx, link.event_id)?;
    tx.commit()?;
    Ok(event)
}

/// Delete an event; its join-table rows go with it.
pub fn delete_event(conn: &Connection, event_id: i64) -> Result<(), StoreError> {
    let rows = conn.execute("DELETE FROM events WHERE id = ?1", [event_id])?;
    if rows == 0 {
        return Err(StoreError::NotFound("Event"));
    }
    Ok(())
}

fn ensure_event_exists(conn: &Connection, event_id: i64) -> Result<(), StoreError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM events WHERE id = ?1)",
        [event_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(StoreError::NotFound("Event"))
    }
}
