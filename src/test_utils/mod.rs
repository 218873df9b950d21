#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod fakes;
pub(crate) mod html;
pub(crate) mod http;

use std::sync::Arc;

use rusqlite::Connection;

use crate::{AppState, Providers};

pub(crate) use db::{create_test_user, get_test_connection, test_identity};
pub(crate) use fakes::{
    FakeIdentityProvider, FakePaymentProvider, FakeTextGenerator, VALID_AUTH_CODE,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment, response_text};
pub(crate) use http::assert_hx_redirect;

/// An [AppState] with fake providers that sign in as [test_identity].
pub(crate) fn get_test_app_state(connection: Connection) -> AppState {
    AppState::new(
        connection,
        "42",
        "Etc/UTC",
        "https://example.com/",
        Providers {
            identity: Arc::new(FakeIdentityProvider {
                identity: test_identity(),
            }),
            payment: Arc::new(FakePaymentProvider::new()),
            text: Arc::new(FakeTextGenerator::new(
                "You spend the most on food.",
                r#"["Cook at home","Buy in bulk","Plan meals"]"#,
            )),
        },
    )
    .expect("Could not create app state.")
}
