//! Persists a user's transactions as a single JSON blob in the key/value storage.
//!
//! Every change goes through [update_transactions], which loads the whole
//! collection, applies the change and writes the whole collection back.

use rusqlite::Connection;

use crate::{
    Error,
    storage::{get_value, put_value},
    transaction::{NewTransaction, Transaction, TransactionId},
    user::UserID,
};

/// The storage key the transaction collection is stored under.
pub const TRANSACTIONS_KEY: &str = "transactions";

/// Load all of the user's transactions in the order they were added.
///
/// A user who has never stored a transaction has an empty collection.
///
/// # Errors
/// Returns an error if the storage could not be read or the stored blob is not valid JSON.
pub fn load_transactions(user_id: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    match get_value(user_id, TRANSACTIONS_KEY, connection)? {
        Some(json) => serde_json::from_str(&json).map_err(|error| {
            tracing::error!("Could not parse stored transactions for user {user_id}: {error}");
            error.into()
        }),
        None => Ok(Vec::new()),
    }
}

/// Apply `update` to the user's transactions and persist the resulting collection.
///
/// Returns whatever `update` returns.
///
/// # Errors
/// Returns an error if the collection could not be loaded, serialized or stored.
pub fn update_transactions<R>(
    user_id: UserID,
    connection: &Connection,
    update: impl FnOnce(&mut Vec<Transaction>) -> R,
) -> Result<R, Error> {
    let mut transactions = load_transactions(user_id, connection)?;
    let result = update(&mut transactions);
    let json = serde_json::to_string(&transactions)?;
    put_value(user_id, TRANSACTIONS_KEY, &json, connection)?;

    Ok(result)
}

/// Add a new transaction to the end of the user's collection.
///
/// # Errors
/// Returns an error if the collection could not be updated.
pub fn add_transaction(
    user_id: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = new_transaction.into_transaction();

    update_transactions(user_id, connection, |transactions| {
        transactions.push(transaction.clone());
    })?;

    Ok(transaction)
}

/// Remove the transaction `id` from the user's collection.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if there is no transaction with
/// the ID `id`, or another error if the collection could not be updated.
pub fn delete_transaction(
    user_id: UserID,
    id: &TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let removed = update_transactions(user_id, connection, |transactions| {
        let original_len = transactions.len();
        transactions.retain(|transaction| &transaction.id != id);
        transactions.len() < original_len
    })?;

    if removed {
        Ok(())
    } else {
        Err(Error::DeleteMissingTransaction)
    }
}
