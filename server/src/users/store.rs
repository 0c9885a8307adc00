use rusqlite::{Connection, OptionalExtension};

use crate::db::models::User;
use crate::db::StoreError;

pub fn insert_user(conn: &Connection, name: &str) -> Result<User, StoreError> {
    conn.execute("INSERT INTO users (name) VALUES (?1)", [name])?;
    Ok(User {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

pub fn get_user(conn: &Connection, user_id: i64) -> Result<User, StoreError> {
    conn.query_row(
        "SELECT id, name FROM users WHERE id = ?1",
        [user_id],
        |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or(StoreError::NotFound("User"))
}

pub fn list_users(conn: &Connection, offset: i64, limit: i64) -> Result<Vec<User>, StoreError> {
    let mut stmt =
        conn.prepare_cached("SELECT id, name FROM users ORDER BY id ASC LIMIT ?1 OFFSET ?2")?;
    let users = stmt
        .query_map([limit, offset], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}
