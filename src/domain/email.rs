//! Email domain types: named service configuration, send requests and
//! composed messages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;

/// Connection security used when talking to the SMTP server
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain connection, no TLS negotiation
    #[default]
    #[serde(alias = "None")]
    None,

    /// Plain connection upgraded with STARTTLS
    #[serde(alias = "StartTls", alias = "start_tls")]
    StartTls,

    /// Implicit TLS (SMTPS)
    #[serde(alias = "Tls", alias = "ssl")]
    Tls,
}

impl SmtpSecurity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::StartTls => "starttls",
            Self::Tls => "tls",
        }
    }
}

/// Configuration of one named mail account
///
/// Accepts both the `snake_case` keys used in config files and the
/// `PascalCase` record shape (`ServiceKey`, `SmtpServer`, ...).
#[derive(Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EmailServiceOptions {
    /// Key the service is registered under
    #[serde(alias = "ServiceKey")]
    pub service_key: String,

    /// SMTP server host
    #[serde(alias = "SmtpServer")]
    pub smtp_server: String,

    /// SMTP port; `None` uses the transport default for `security`
    #[serde(alias = "Port")]
    pub port: Option<u16>,

    #[serde(alias = "Security")]
    pub security: SmtpSecurity,

    #[serde(alias = "UserName")]
    pub user_name: String,

    #[serde(alias = "Password")]
    pub password: String,

    /// Sender address
    #[serde(alias = "From")]
    pub from: String,

    /// Sender display name (blank means none)
    #[serde(alias = "FromName")]
    pub from_name: String,

    /// Cc addresses added to every message sent through this service
    #[serde(alias = "CcEmailAddresses")]
    pub cc_email_addresses: Vec<String>,

    /// Bcc addresses added to every message sent through this service
    #[serde(alias = "BccEmailAddresses")]
    pub bcc_email_addresses: Vec<String>,
}

impl fmt::Debug for EmailServiceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailServiceOptions")
            .field("service_key", &self.service_key)
            .field("smtp_server", &self.smtp_server)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("user_name", &self.user_name)
            .field("password", &"***")
            .field("from", &self.from)
            .field("from_name", &self.from_name)
            .field("cc_email_addresses", &self.cc_email_addresses)
            .field("bcc_email_addresses", &self.bcc_email_addresses)
            .finish()
    }
}

/// A readable attachment stream that can be repositioned
pub trait SeekableRead: Read + Seek + Send {}

impl<T: Read + Seek + Send> SeekableRead for T {}

/// Stream content for an attachment
pub enum AttachmentStream {
    /// Rewound to the start before every read
    Seekable(Box<dyn SeekableRead>),
    /// Read from its current position
    Forward(Box<dyn Read + Send>),
}

impl AttachmentStream {
    /// Read the whole stream, rewinding first when possible.
    ///
    /// This is blocking `std::io`. It runs while a request is composed, on
    /// the task calling `send`, so streams should be in-memory or backed by
    /// fast local files. Slow sources should be buffered into
    /// [`EmailAttachment::from_bytes`] beforehand.
    pub fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        match self {
            Self::Seekable(stream) => {
                stream.seek(SeekFrom::Start(0))?;
                stream.read_to_end(&mut buf)?;
            }
            Self::Forward(stream) => {
                stream.read_to_end(&mut buf)?;
            }
        }
        Ok(buf)
    }

    pub fn is_seekable(&self) -> bool {
        matches!(self, Self::Seekable(_))
    }
}

impl fmt::Debug for AttachmentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seekable(_) => f.write_str("AttachmentStream::Seekable(..)"),
            Self::Forward(_) => f.write_str("AttachmentStream::Forward(..)"),
        }
    }
}

/// Where an attachment's content comes from
#[derive(Debug)]
pub enum AttachmentSource {
    /// File on disk, read when the message is serialized
    Path(PathBuf),
    /// In-memory content
    Bytes(Vec<u8>),
    /// Readable stream
    Stream(AttachmentStream),
}

/// Attachment descriptor supplied with a request
#[derive(Debug, Default)]
pub struct EmailAttachment {
    /// Name shown to the recipient; required for byte and stream sources.
    /// Path sources always use the path's own name.
    pub file_name: Option<String>,
    /// Explicit content type for byte and stream sources, overrides
    /// extension lookup
    pub content_type: Option<String>,
    pub source: Option<AttachmentSource>,
}

impl EmailAttachment {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(AttachmentSource::Path(path.into())),
            ..Default::default()
        }
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            content_type: None,
            source: Some(AttachmentSource::Bytes(bytes.into())),
        }
    }

    /// Attach a seekable stream; it is rewound before each send.
    pub fn from_reader<R: Read + Seek + Send + 'static>(
        file_name: impl Into<String>,
        reader: R,
    ) -> Self {
        Self {
            file_name: Some(file_name.into()),
            content_type: None,
            source: Some(AttachmentSource::Stream(AttachmentStream::Seekable(
                Box::new(reader),
            ))),
        }
    }

    /// Attach a forward-only stream.
    pub fn from_forward_reader<R: Read + Send + 'static>(
        file_name: impl Into<String>,
        reader: R,
    ) -> Self {
        Self {
            file_name: Some(file_name.into()),
            content_type: None,
            source: Some(AttachmentSource::Stream(AttachmentStream::Forward(Box::new(
                reader,
            )))),
        }
    }

    /// Build a descriptor from independently optional sources.
    ///
    /// The first usable source wins: a non-empty path, then a non-empty
    /// byte buffer, then a stream.
    pub fn from_parts(
        file_name: Option<String>,
        file_path: Option<PathBuf>,
        file_bytes: Option<Vec<u8>>,
        file_stream: Option<AttachmentStream>,
        content_type: Option<String>,
    ) -> Self {
        let source = match (file_path, file_bytes, file_stream) {
            (Some(path), _, _) if !path.as_os_str().is_empty() => Some(AttachmentSource::Path(path)),
            (_, Some(bytes), _) if !bytes.is_empty() => Some(AttachmentSource::Bytes(bytes)),
            (_, _, Some(stream)) => Some(AttachmentSource::Stream(stream)),
            _ => None,
        };

        Self {
            file_name,
            content_type,
            source,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// A send request, consumed by one `send` call
#[derive(Debug, Default)]
pub struct EmailRequest {
    pub to_emails: Vec<String>,
    /// Merged with the service's default Cc list
    pub cc_emails: Vec<String>,
    /// Merged with the service's default Bcc list
    pub bcc_emails: Vec<String>,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub attachments: Vec<EmailAttachment>,
}

impl EmailRequest {
    pub fn new<I, S>(to_emails: I, subject: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            to_emails: to_emails.into_iter().map(Into::into).collect(),
            subject: subject.into(),
            ..Default::default()
        }
    }

    pub fn with_cc<I, S>(mut self, cc_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cc_emails = cc_emails.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bcc<I, S>(mut self, bcc_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bcc_emails = bcc_emails.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_html_body(mut self, html_body: impl Into<String>) -> Self {
        self.html_body = Some(html_body.into());
        self
    }

    pub fn with_text_body(mut self, text_body: impl Into<String>) -> Self {
        self.text_body = Some(text_body.into());
        self
    }

    pub fn with_attachment(mut self, attachment: EmailAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Email address with optional display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    pub email: String,
    pub name: Option<String>,
}

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }
}

/// Content bound to a composed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentContent {
    /// Read from disk when the message is serialized
    File(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub content: AttachmentContent,
}

/// Fully composed outgoing message
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub from: EmailAddress,
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub bcc: Vec<EmailAddress>,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub attachments: Vec<MessageAttachment>,
}

impl EmailMessage {
    /// Every envelope recipient: To, Cc and Bcc
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}
