//! SMTP transport trait and error types

use crate::domain::{EmailMessage, SmtpSecurity};
use async_trait::async_trait;
use thiserror::Error;

/// Transport error types
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Not connected to an SMTP server")]
    NotConnected,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// An SMTP session handle
///
/// One handle drives one session at a time; callers run
/// `connect`, `authenticate`, `send` and `disconnect` in that order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmtpTransport: Send {
    /// Open a session with `host`. `port` of `None` uses the default for `security`.
    async fn connect(
        &mut self,
        host: &str,
        port: Option<u16>,
        security: SmtpSecurity,
    ) -> Result<(), TransportError>;

    async fn authenticate(&mut self, username: &str, password: &str)
        -> Result<(), TransportError>;

    /// Transmit a composed message over the open session
    async fn send(&mut self, message: &EmailMessage) -> Result<(), TransportError>;

    /// End the session; `quit` sends the termination command first
    async fn disconnect(&mut self, quit: bool) -> Result<(), TransportError>;

    /// Release every resource held by the handle
    fn dispose(&mut self);
}

/// Creates transport handles for newly registered services
#[cfg_attr(test, mockall::automock)]
pub trait TransportFactory: Send + Sync {
    fn create(&self) -> Box<dyn SmtpTransport>;
}
