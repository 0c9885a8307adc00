use rusqlite_migration::{Migrations, M};

/// Define all schema migrations.
/// Progress is tracked in the SQLite user_version pragma.
pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        "-- Migration 1: Initial schema

CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

CREATE INDEX idx_users_name ON users(name);

CREATE TABLE events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    event_dt TEXT,
    duration TEXT NOT NULL,
    location TEXT NOT NULL,
    organizer_id INTEGER
);

CREATE TABLE user_event_link (
    user_id INTEGER NOT NULL,
    event_id INTEGER NOT NULL,
    PRIMARY KEY (user_id, event_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (event_id) REFERENCES events(id) ON DELETE CASCADE
);

CREATE INDEX idx_user_event_link_event ON user_event_link(event_id);
",
    )])
}
