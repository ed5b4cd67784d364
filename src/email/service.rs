//! Email service bound to one named SMTP account

use super::compose::compose;
use super::transport::{SmtpTransport, TransportError};
use crate::domain::{EmailMessage, EmailRequest, EmailServiceOptions};
use crate::error::{EmailError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{error, info};

/// Sends requests through a named account
///
/// Handles of this type are borrowed from the registry and shared by every
/// caller of the same key, so they cannot release the transport. Disposal
/// belongs to the owning [`EmailService`].
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Compose and deliver `request`
    async fn send(&self, request: &mut EmailRequest) -> Result<()>;
}

/// Service for sending emails through one configured account
///
/// Owns its transport handle. Concurrent sends on the same service are
/// serialized on the handle; separate services never share state.
pub struct EmailService {
    options: EmailServiceOptions,
    transport: Mutex<Box<dyn SmtpTransport>>,
    disposed: AtomicBool,
}

impl EmailService {
    pub fn new(options: EmailServiceOptions, transport: Box<dyn SmtpTransport>) -> Self {
        Self {
            options,
            transport: Mutex::new(transport),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn service_key(&self) -> &str {
        &self.options.service_key
    }

    pub fn options(&self) -> &EmailServiceOptions {
        &self.options
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Send an email
    ///
    /// The request is validated and composed before the transport is touched.
    /// Delivery failures are logged once and returned unchanged.
    pub async fn send(&self, request: &mut EmailRequest) -> Result<()> {
        if self.is_disposed() {
            return Err(EmailError::Disposed);
        }

        let message = compose(&self.options, request)?;

        let mut transport = self.transport.lock().await;
        if self.is_disposed() {
            return Err(EmailError::Disposed);
        }

        if let Err(e) = self.deliver(&mut **transport, &message).await {
            error!(
                service_key = %self.options.service_key,
                smtp_server = %self.options.smtp_server,
                error = %e,
                "Failed to send email"
            );
            return Err(e.into());
        }

        info!(
            service_key = %self.options.service_key,
            recipients = message.recipient_count(),
            attachments = message.attachments.len(),
            "Email sent"
        );
        Ok(())
    }

    /// Release the transport handle exactly once
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.transport.lock().await.dispose();
    }

    async fn deliver(
        &self,
        transport: &mut dyn SmtpTransport,
        message: &EmailMessage,
    ) -> std::result::Result<(), TransportError> {
        transport
            .connect(
                &self.options.smtp_server,
                self.options.port,
                self.options.security,
            )
            .await?;
        transport
            .authenticate(&self.options.user_name, &self.options.password)
            .await?;
        transport.send(message).await?;
        transport.disconnect(true).await
    }
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("options", &self.options)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl Drop for EmailService {
    fn drop(&mut self) {
        if !*self.disposed.get_mut() {
            *self.disposed.get_mut() = true;
            self.transport.get_mut().dispose();
        }
    }
}

#[async_trait]
impl EmailSender for EmailService {
    async fn send(&self, request: &mut EmailRequest) -> Result<()> {
        EmailService::send(self, request).await
    }
}
