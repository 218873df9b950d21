//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    dashboard::{
        aggregation::{TimeRange, filter_by_range},
        charts::{build_charts, charts_script, charts_view},
    },
    endpoints,
    html::{CARD_STYLE, CARD_TITLE_STYLE, HeadElement, PAGE_CONTAINER_STYLE, base, format_currency},
    insights::{insights_card, upsell_card},
    navigation::header,
    tier::visible,
    timezone::local_today,
    transaction::{Transaction, load_transactions, transaction_form, transaction_list},
    user::{UserID, get_user_by_id},
};

const ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading the user and their transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string for the dashboard page.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// The time window shown in the charts.
    #[serde(default)]
    pub range: TimeRange,
}

fn balance_card(balance: f64) -> Markup {
    let balance_style = if balance >= 0.0 {
        "text-3xl font-bold text-green-600 dark:text-green-400"
    } else {
        "text-3xl font-bold text-red-600 dark:text-red-400"
    };

    html! {
        section class=(CARD_STYLE)
        {
            h2 class=(CARD_TITLE_STYLE) { "Current Balance" }
            p id="balance" class=(balance_style) { (format_currency(balance)) }
        }
    }
}

fn range_tabs(selected: TimeRange) -> Markup {
    const ACTIVE_TAB_STYLE: &str = "px-4 py-2 text-sm font-medium rounded \
        text-white bg-blue-600 dark:bg-blue-500";
    const TAB_STYLE: &str = "px-4 py-2 text-sm font-medium rounded \
        text-gray-700 bg-gray-100 hover:bg-gray-200 \
        dark:text-gray-200 dark:bg-gray-700 dark:hover:bg-gray-600";

    html! {
        nav id="range-tabs" class="flex gap-2 mb-4" aria-label="Time range"
        {
            @for range in [TimeRange::Week, TimeRange::Month, TimeRange::All] {
                @let is_selected = range == selected;

                a
                    href={ (endpoints::DASHBOARD_VIEW) "?range=" (range.as_query_value()) }
                    class=(if is_selected { ACTIVE_TAB_STYLE } else { TAB_STYLE })
                    aria-current=[is_selected.then_some("page")]
                {
                    (range.label())
                }
            }
        }
    }
}

fn charts_section(range: TimeRange, charts: Markup) -> Markup {
    html! {
        section id="charts" class=(CARD_STYLE)
        {
            (range_tabs(range))
            (charts)
        }
    }
}

fn total_balance(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .map(Transaction::signed_amount)
        .sum()
}

/// Display the dashboard for the signed in user.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let (user, transactions) = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        let user = match get_user_by_id(user_id, &connection) {
            Ok(user) => user,
            Err(error) => {
                tracing::error!("Could not get user {user_id}: {error}");
                return error.into_response();
            }
        };

        match load_transactions(user_id, &connection) {
            Ok(transactions) => (user, transactions),
            Err(error) => return error.into_response(),
        }
    };

    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };

    let visible_transactions = visible(&transactions, user.is_premium, today);
    let transactions_in_range = filter_by_range(&visible_transactions, query.range, today);
    let charts = build_charts(&transactions_in_range);

    let mut head_elements = Vec::new();
    if !transactions.is_empty() {
        head_elements.push(HeadElement::ScriptLink(ECHARTS_URL.to_owned()));
        head_elements.push(charts_script(&charts));
    }

    let content = html! {
        (header(&user))

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="grid grid-cols-1 gap-6 lg:grid-cols-2"
            {
                (transaction_form(today))
                (balance_card(total_balance(&transactions)))
            }

            (transaction_list(&transactions, user.is_premium, today))

            @if !transactions.is_empty() {
                (charts_section(query.range, charts_view(&charts)))
            }

            @if !user.is_premium {
                (upsell_card())
            } @else if !visible_transactions.is_empty() {
                (insights_card())
            }
        }
    };

    base("Dashboard", &head_elements, &content).into_response()
}
