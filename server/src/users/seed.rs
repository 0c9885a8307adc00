use crate::db::models::User;
use crate::db::StoreError;

use super::store::insert_user;

/// Name of the user created on first boot.
pub const ADMIN_NAME: &str = "admin";

/// Create the admin user if the users table is empty (idempotent guard).
pub fn seed_admin(conn: &rusqlite::Connection) -> Result<Option<User>, StoreError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(None);
    }
    insert_user(conn, ADMIN_NAME).map(Some)
}
