//! Newsletter subscribe form.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use serde::Serialize;

use super::ViewScope;
use crate::errors::AppError;
use crate::models::SubscribeReply;
use crate::upstream::UpstreamClient;

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const SUBSCRIBED_MESSAGE: &str = "Thanks for subscribing!";
pub const SUBSCRIBE_FAILED_MESSAGE: &str = "Subscription failed. Please try again.";

static EMAIL_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map_err(|e| tracing::error!("Invalid email pattern: {}", e))
        .ok()
});

/// Shape check on an address that has already been trimmed.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}

/// A subscription request that has been validated but not sent yet.
///
/// The form reports itself as submitting from the moment this is created until
/// [`SubscribeForm::finish`] receives the answer.
pub struct PendingSubscribe {
    client: Arc<UpstreamClient>,
    scope: ViewScope,
    email: String,
}

/// Upstream answer for a [`PendingSubscribe`].
pub struct SubscribeAnswer {
    result: Result<(StatusCode, SubscribeReply), AppError>,
}

impl PendingSubscribe {
    /// Issue the single `POST /subscribe/`.
    pub async fn send(self) -> SubscribeAnswer {
        let result = self.scope.run(self.client.subscribe(&self.email)).await;
        SubscribeAnswer { result }
    }
}

/// Serializable snapshot of the subscribe form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeView {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub button_disabled: bool,
}

/// Single-field email signup.
pub struct SubscribeForm {
    client: Arc<UpstreamClient>,
    scope: ViewScope,
    email: String,
    submitting: bool,
    message: Option<String>,
}

impl SubscribeForm {
    pub fn new(client: Arc<UpstreamClient>) -> Self {
        Self {
            client,
            scope: ViewScope::new(),
            email: String::new(),
            submitting: false,
            message: None,
        }
    }

    /// Tie the form's requests to `parent`, so unmounting the parent cancels them.
    pub fn within(mut self, parent: &ViewScope) -> Self {
        self.scope = parent.child();
        self
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    /// The button stays disabled while a request is in flight.
    pub fn snapshot(&self) -> SubscribeView {
        SubscribeView {
            email: self.email.clone(),
            message: self.message.clone(),
            button_disabled: self.submitting,
        }
    }

    /// Validate the address and POST it, returning the message to show.
    pub async fn submit(&mut self) -> Result<String, AppError> {
        let pending = self.begin()?;
        let answer = pending.send().await;
        self.finish(answer)
    }

    /// Validate the address and mark the form as submitting.
    ///
    /// An invalid address is reported inline and nothing is prepared for sending.
    pub fn begin(&mut self) -> Result<PendingSubscribe, AppError> {
        let email = self.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(self.fail(AppError::Validation(INVALID_EMAIL_MESSAGE.to_string())));
        }

        self.submitting = true;
        self.message = None;
        Ok(PendingSubscribe {
            client: self.client.clone(),
            scope: self.scope.clone(),
            email,
        })
    }

    /// Apply the upstream answer and re-enable the button.
    pub fn finish(&mut self, answer: SubscribeAnswer) -> Result<String, AppError> {
        self.submitting = false;

        match answer.result {
            Ok((status, reply)) if status.is_success() => {
                let text = non_blank(reply.message).unwrap_or_else(|| SUBSCRIBED_MESSAGE.to_string());
                tracing::info!("New newsletter subscription");
                self.email.clear();
                self.message = Some(text.clone());
                Ok(text)
            }
            Ok((status, reply)) => {
                let text = non_blank(reply.error)
                    .or_else(|| non_blank(reply.message))
                    .unwrap_or_else(|| SUBSCRIBE_FAILED_MESSAGE.to_string());
                Err(self.fail(AppError::Upstream {
                    status: status.as_u16(),
                    message: text,
                }))
            }
            Err(e @ AppError::Cancelled(_)) => Err(e),
            Err(e) => {
                tracing::warn!("Subscription request failed: {}", e);
                Err(self.fail(AppError::Network(SUBSCRIBE_FAILED_MESSAGE.to_string())))
            }
        }
    }

    fn fail(&mut self, error: AppError) -> AppError {
        self.message = Some(error.message());
        error
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
