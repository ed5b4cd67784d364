//! Email sending functionality for Mailroom
//!
//! Named SMTP accounts are registered once at startup. Each account gets an
//! [`EmailService`] that validates requests, composes messages and drives an
//! [`SmtpTransport`] (lettre in production).

pub mod addresses;
pub mod attachment;
pub mod compose;
pub mod content_type;
pub mod registry;
pub mod service;
pub mod smtp;
pub mod transport;

pub use addresses::merge_addresses;
pub use attachment::resolve_attachment;
pub use compose::compose;
pub use content_type::content_type_for;
pub use registry::{EmailServiceFactory, EmailServiceRegistry};
pub use service::{EmailSender, EmailService};
pub use smtp::{LettreSmtpTransport, LettreTransportFactory};
pub use transport::{SmtpTransport, TransportError, TransportFactory};
