use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{Html, IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    insights::{
        generator::TextGenerator,
        requester::request_insights,
        view::{insights_content, upsell_card},
    },
    transaction::load_transactions,
    user::{UserID, is_premium},
};

/// The state needed to generate insights.
#[derive(Clone)]
pub struct InsightsState {
    /// The database connection for reading transactions and the Premium flag.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Generates the insight text.
    pub text_generator: Arc<dyn TextGenerator>,
}

impl FromRef<AppState> for InsightsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            text_generator: state.text_generator.clone(),
        }
    }
}

/// Generate insights over the transactions visible to the user.
///
/// Free users get the upsell card and the text generator is never called.
/// Renders nothing if the user has no visible transactions.
pub async fn get_insights(
    State(state): State<InsightsState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    // Premium users can see their full history, so insights cover every transaction.
    let transactions = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        match is_premium(user_id, &connection) {
            Ok(true) => {}
            Ok(false) => return upsell_card().into_response(),
            Err(error) => return error.into_alert_response(),
        }

        match load_transactions(user_id, &connection) {
            Ok(transactions) => transactions,
            Err(error) => return error.into_alert_response(),
        }
    };

    if transactions.is_empty() {
        return Html(String::new()).into_response();
    }

    let insights = request_insights(&transactions, state.text_generator.as_ref()).await;

    insights_content(&insights).into_response()
}
