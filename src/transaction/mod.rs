//! Transaction management for the expense tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and how it is serialized
//! - The store that persists a user's transactions as a single blob
//! - The endpoints for creating and deleting transactions
//! - The form and list shown on the dashboard

mod core;
mod create_endpoint;
mod delete_endpoint;
mod form;
mod list;
mod store;

pub use core::{NewTransaction, Transaction, TransactionId, TransactionKind};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use form::transaction_form;
pub use list::transaction_list;
pub use store::{add_transaction, load_transactions};
