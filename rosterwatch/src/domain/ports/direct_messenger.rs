//! Driven port for delivering a private message to one recipient.

use std::fmt;

use async_trait::async_trait;

use super::define_port_error;

/// Identifier of a notification recipient as the chat service understands it.
///
/// The service accepts a numeric user id, an email address, or an
/// `@mention` handle; the value is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecipientId(String);

impl RecipientId {
    /// Wrap a recipient identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

define_port_error! {
    /// Errors surfaced while delivering a private message.
    pub enum DirectMessageError {
        /// The service does not know the recipient.
        UnknownRecipient { message: String } =>
            "recipient not found: {message}",
        /// The service rejected the credential.
        Unauthorized { message: String } =>
            "message delivery unauthorized: {message}",
        /// The service throttled the request.
        RateLimited { message: String } =>
            "message delivery rate limited: {message}",
        /// The request did not complete in time.
        Timeout { message: String } =>
            "message delivery timed out: {message}",
        /// Network or server failure.
        Transport { message: String } =>
            "message transport failed: {message}",
    }
}

/// Port for sending one message body to one recipient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectMessenger: Send + Sync {
    /// Deliver `message` to `recipient`.
    async fn send_message(
        &self,
        recipient: &RecipientId,
        message: &str,
    ) -> Result<(), DirectMessageError>;
}

/// Fixture messenger that accepts and discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureDirectMessenger;

#[async_trait]
impl DirectMessenger for FixtureDirectMessenger {
    async fn send_message(
        &self,
        _recipient: &RecipientId,
        _message: &str,
    ) -> Result<(), DirectMessageError> {
        Ok(())
    }
}
