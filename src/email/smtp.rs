//! SMTP transport implementation using lettre

use super::transport::{SmtpTransport, TransportError, TransportFactory};
use crate::domain::{AttachmentContent, EmailAddress, EmailMessage, MessageAttachment, SmtpSecurity};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::{authentication::Credentials, AsyncSmtpTransportBuilder},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

/// SMTP transport backed by lettre's async client
///
/// lettre opens the TCP/TLS session itself, so `connect` prepares the
/// endpoint and `authenticate` opens a probe session with the credentials.
/// Without the `pool` feature every submission uses a fresh connection,
/// which `disconnect` then forgets.
#[derive(Default)]
pub struct LettreSmtpTransport {
    endpoint: Option<AsyncSmtpTransportBuilder>,
    session: Option<AsyncSmtpTransport<Tokio1Executor>>,
    disposed: bool,
}

impl LettreSmtpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn ensure_live(&self) -> Result<(), TransportError> {
        if self.disposed {
            Err(TransportError::InvalidConfiguration(
                "Transport has been disposed".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SmtpTransport for LettreSmtpTransport {
    async fn connect(
        &mut self,
        host: &str,
        port: Option<u16>,
        security: SmtpSecurity,
    ) -> Result<(), TransportError> {
        self.ensure_live()?;

        let mut builder = match security {
            SmtpSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
            SmtpSecurity::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| TransportError::InvalidConfiguration(e.to_string()))?,
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| TransportError::InvalidConfiguration(e.to_string()))?,
        };

        if let Some(port) = port {
            builder = builder.port(port);
        }

        debug!(host, ?port, security = security.as_str(), "Prepared SMTP endpoint");

        self.session = None;
        self.endpoint = Some(builder);
        Ok(())
    }

    async fn authenticate(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<(), TransportError> {
        self.ensure_live()?;

        let mut builder = self.endpoint.take().ok_or(TransportError::NotConnected)?;

        // Servers without AUTH are configured with an empty user name
        if !username.is_empty() {
            builder = builder.credentials(Credentials::new(
                username.to_string(),
                password.to_string(),
            ));
        }

        let transport = builder.build();

        match transport.test_connection().await {
            Ok(true) => {
                self.session = Some(transport);
                Ok(())
            }
            Ok(false) => Err(TransportError::ConnectionError(
                "SMTP server did not accept the connection".to_string(),
            )),
            Err(e) => Err(classify_error(e.to_string(), true)),
        }
    }

    async fn send(&mut self, message: &EmailMessage) -> Result<(), TransportError> {
        self.ensure_live()?;

        let session = self.session.as_ref().ok_or(TransportError::NotConnected)?;
        let email = build_message(message).await?;

        let response = session
            .send(email)
            .await
            .map_err(|e| classify_error(e.to_string(), false))?;

        debug!(
            code = %response.code(),
            response = response.message().next().unwrap_or_default(),
            "SMTP server accepted message"
        );
        Ok(())
    }

    async fn disconnect(&mut self, quit: bool) -> Result<(), TransportError> {
        debug!(quit, "Closing SMTP session");
        self.session = None;
        self.endpoint = None;
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.session = None;
        self.endpoint = None;
        self.disposed = true;
    }
}

/// Creates a fresh [`LettreSmtpTransport`] per service
#[derive(Debug, Default, Clone, Copy)]
pub struct LettreTransportFactory;

impl TransportFactory for LettreTransportFactory {
    fn create(&self) -> Box<dyn SmtpTransport> {
        Box::new(LettreSmtpTransport::new())
    }
}

fn classify_error(error_msg: String, during_auth: bool) -> TransportError {
    if error_msg.contains("authentication") || error_msg.contains("AUTH") {
        TransportError::AuthenticationFailed(error_msg)
    } else if error_msg.contains("connection") || error_msg.contains("timeout") || during_auth {
        TransportError::ConnectionError(error_msg)
    } else {
        TransportError::SendFailed(error_msg)
    }
}

fn mailbox(address: &EmailAddress) -> Result<Mailbox, TransportError> {
    let email = address.email.parse().map_err(|e| {
        TransportError::InvalidMessage(format!("Invalid address '{}': {}", address.email, e))
    })?;
    Ok(Mailbox::new(address.name.clone(), email))
}

enum Body {
    Single(SinglePart),
    Alternative(MultiPart),
}

fn body(message: &EmailMessage) -> Body {
    match (&message.text_body, &message.html_body) {
        (Some(text), Some(html)) => {
            Body::Alternative(MultiPart::alternative_plain_html(text.clone(), html.clone()))
        }
        (None, Some(html)) => Body::Single(SinglePart::html(html.clone())),
        (Some(text), None) => Body::Single(SinglePart::plain(text.clone())),
        (None, None) => Body::Single(SinglePart::plain(String::new())),
    }
}

async fn attachment_part(attachment: &MessageAttachment) -> Result<SinglePart, TransportError> {
    let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
        TransportError::InvalidMessage(format!(
            "Invalid content type '{}': {}",
            attachment.content_type, e
        ))
    })?;

    let content = match &attachment.content {
        AttachmentContent::File(path) => tokio::fs::read(path).await.map_err(|e| {
            TransportError::InvalidMessage(format!(
                "Failed to read attachment {}: {}",
                path.display(),
                e
            ))
        })?,
        AttachmentContent::Bytes(bytes) => bytes.clone(),
    };

    Ok(Attachment::new(attachment.file_name.clone()).body(content, content_type))
}

/// Serialize a composed message into a MIME message.
///
/// File attachments are read from disk here.
pub async fn build_message(message: &EmailMessage) -> Result<Message, TransportError> {
    let mut builder = Message::builder()
        .from(mailbox(&message.from)?)
        .subject(message.subject.clone());

    for to in &message.to {
        builder = builder.to(mailbox(to)?);
    }
    for cc in &message.cc {
        builder = builder.cc(mailbox(cc)?);
    }
    for bcc in &message.bcc {
        builder = builder.bcc(mailbox(bcc)?);
    }

    let email = if message.attachments.is_empty() {
        match body(message) {
            Body::Single(part) => builder.singlepart(part),
            Body::Alternative(multipart) => builder.multipart(multipart),
        }
    } else {
        let mut mixed = match body(message) {
            Body::Single(part) => MultiPart::mixed().singlepart(part),
            Body::Alternative(multipart) => MultiPart::mixed().multipart(multipart),
        };
        for attachment in &message.attachments {
            mixed = mixed.singlepart(attachment_part(attachment).await?);
        }
        builder.multipart(mixed)
    };

    email.map_err(|e| TransportError::InvalidMessage(e.to_string()))
}
