//! Stand-ins for the external providers that never touch the network.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use crate::{
    Error, IdentityProvider, PaymentProvider, TextGenerator,
    billing::{CheckoutRequest, CheckoutSession, PaymentStatus},
    user::Identity,
};

fn fake_error(provider: &'static str) -> Error {
    Error::ProviderError {
        provider,
        message: "fake provider failure".to_owned(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("fake provider lock poisoned")
}

/// Accepts the code "valid-code" and signs in as `identity`.
pub(crate) struct FakeIdentityProvider {
    pub identity: Identity,
}

pub(crate) const VALID_AUTH_CODE: &str = "valid-code";

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://identity.example/authorize?state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<Identity, Error> {
        if code == VALID_AUTH_CODE {
            Ok(self.identity.clone())
        } else {
            Err(fake_error("FakeIdentity"))
        }
    }
}

/// Creates unpaid sessions and serves sessions registered with [FakePaymentProvider::with_session].
pub(crate) struct FakePaymentProvider {
    sessions: Mutex<HashMap<String, CheckoutSession>>,
    requests: Mutex<Vec<CheckoutRequest>>,
    fail: bool,
}

impl FakePaymentProvider {
    pub(crate) fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub(crate) fn with_session(self, session: CheckoutSession) -> Self {
        lock(&self.sessions).insert(session.id.clone(), session);
        self
    }

    pub(crate) fn requests(&self) -> Vec<CheckoutRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl PaymentProvider for FakePaymentProvider {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, Error> {
        if self.fail {
            return Err(fake_error("FakePayment"));
        }

        let mut requests = lock(&self.requests);
        requests.push(request.clone());
        let id = format!("cs_test_{}", requests.len());
        let session = CheckoutSession {
            url: Some(format!("https://checkout.example/{id}")),
            id: id.clone(),
            payment_status: PaymentStatus::Unpaid,
            client_reference_id: Some(request.client_reference_id.clone()),
        };
        lock(&self.sessions).insert(id, session.clone());

        Ok(session)
    }

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<CheckoutSession, Error> {
        if self.fail {
            return Err(fake_error("FakePayment"));
        }

        lock(&self.sessions)
            .get(session_id)
            .cloned()
            .ok_or_else(|| fake_error("FakePayment"))
    }
}

/// Answers tips prompts with `tips` and every other prompt with `observation`.
pub(crate) struct FakeTextGenerator {
    responses: Option<(String, String)>,
    prompts: Mutex<Vec<String>>,
}

impl FakeTextGenerator {
    pub(crate) fn new(observation: &str, tips: &str) -> Self {
        Self {
            responses: Some((observation.to_owned(), tips.to_owned())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            responses: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// The prompts received so far.
    pub(crate) fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl TextGenerator for FakeTextGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, Error> {
        lock(&self.prompts).push(prompt.to_owned());

        let (observation, tips) = self
            .responses
            .as_ref()
            .ok_or_else(|| fake_error("FakeText"))?;

        if prompt.contains("JSON array") {
            Ok(tips.clone())
        } else {
            Ok(observation.clone())
        }
    }
}
