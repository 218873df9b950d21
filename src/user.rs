//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Who a user is according to the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The provider's stable identifier for the user (e.g. the OpenID `sub` claim).
    pub subject: String,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The identity provider's identifier for the user.
    pub subject: String,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// Whether the user has paid for the Premium subscription.
    pub is_premium: bool,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                subject TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                is_premium INTEGER NOT NULL DEFAULT 0
                )",
        (),
    )?;

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: UserID::new(row.get(0)?),
        subject: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        is_premium: row.get(4)?,
    })
}

/// Insert the user described by `identity`, or refresh the name and email of
/// the existing user with the same subject.
///
/// The premium flag of an existing user is left untouched.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn upsert_user(identity: &Identity, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (subject, name, email) VALUES (?1, ?2, ?3)
        ON CONFLICT(subject) DO UPDATE SET name = excluded.name, email = excluded.email",
        (&identity.subject, &identity.name, &identity.email),
    )?;

    connection
        .prepare("SELECT id, subject, name, email, is_premium FROM user WHERE subject = :subject")?
        .query_row(&[(":subject", &identity.subject)], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, subject, name, email, is_premium FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Whether the user `user_id` has the Premium subscription.
///
/// Unknown users are not premium.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn is_premium(user_id: UserID, connection: &Connection) -> Result<bool, Error> {
    let is_premium = connection
        .query_row(
            "SELECT is_premium FROM user WHERE id = ?1",
            (user_id.as_i64(),),
            |row| row.get(0),
        )
        .optional()?;

    Ok(is_premium.unwrap_or(false))
}

/// Mark the user `user_id` as having the Premium subscription.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist, or a [Error::SqlError]
/// if an SQL related error occurred.
pub fn set_premium(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET is_premium = 1 WHERE id = ?1",
        (user_id.as_i64(),),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
