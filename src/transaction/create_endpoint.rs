//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    transaction::{NewTransaction, TransactionKind, store::add_transaction},
    user::UserID,
};

/// The smallest amount a transaction may have, one cent.
const MIN_AMOUNT: f64 = 0.01;

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Text detailing the transaction.
    pub description: String,
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The date when the transaction ocurred.
    pub date: Date,
    /// An optional label for grouping transactions.
    #[serde(default)]
    pub category: Option<String>,
}

impl TryFrom<TransactionForm> for NewTransaction {
    type Error = Error;

    fn try_from(form: TransactionForm) -> Result<Self, Self::Error> {
        let description = form.description.trim();
        if description.is_empty() {
            return Err(Error::InvalidTransaction(
                "Description cannot be empty.".to_owned(),
            ));
        }

        if !form.amount.is_finite() || form.amount < MIN_AMOUNT {
            return Err(Error::InvalidTransaction(format!(
                "Amount must be at least {MIN_AMOUNT:.2}, got {}.",
                form.amount
            )));
        }

        let category = form
            .category
            .map(|category| category.trim().to_owned())
            .filter(|category| !category.is_empty());

        Ok(NewTransaction {
            description: description.to_owned(),
            amount: form.amount,
            kind: form.kind,
            date: form.date,
            category,
        })
    }
}

/// A route handler for creating a new transaction, redirects to the dashboard on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let new_transaction = match NewTransaction::try_from(form) {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            tracing::debug!("Rejected transaction form: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = add_transaction(user_id, new_transaction, &connection) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
