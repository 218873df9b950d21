//! A per-user key/value store for serialized blobs.

use rusqlite::{Connection, OptionalExtension};

use crate::{Error, user::UserID};

/// Create the storage table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_storage_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS storage (
                user_id INTEGER NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (user_id, key),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Get the value stored under `key` for `user_id`, or `None` if nothing has been stored yet.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_value(user_id: UserID, key: &str, connection: &Connection) -> Result<Option<String>, Error> {
    connection
        .query_row(
            "SELECT value FROM storage WHERE user_id = ?1 AND key = ?2",
            (user_id.as_i64(), key),
            |row| row.get(0),
        )
        .optional()
        .map_err(|error| error.into())
}

/// Store `value` under `key` for `user_id`, replacing any existing value.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn put_value(user_id: UserID, key: &str, value: &str, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO storage (user_id, key, value) VALUES (?1, ?2, ?3)
        ON CONFLICT(user_id, key) DO UPDATE SET value = excluded.value",
        (user_id.as_i64(), key, value),
    )?;

    Ok(())
}
