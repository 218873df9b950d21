use rusqlite::Connection;

use crate::{
    db::initialize,
    user::{Identity, User, set_premium, upsert_user},
};

/// An in-memory database with all tables created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    connection
}

pub(crate) fn test_identity() -> Identity {
    Identity {
        subject: "google-oauth2|1234".to_owned(),
        name: "Test User".to_owned(),
        email: "test@example.com".to_owned(),
    }
}

pub(crate) fn create_test_user(connection: &Connection, is_premium: bool) -> User {
    let mut user = upsert_user(&test_identity(), connection).expect("Could not create test user.");

    if is_premium {
        set_premium(user.id, connection).expect("Could not set Premium for test user.");
        user.is_premium = true;
    }

    user
}
