//! Mailroom Core - Keyed SMTP email services
//!
//! This crate registers named SMTP accounts at startup and exposes one
//! email service per account for composing and delivering messages.

pub mod config;
pub mod domain;
pub mod email;
pub mod error;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use domain::{EmailAttachment, EmailRequest, EmailServiceOptions, SmtpSecurity};
pub use email::{EmailSender, EmailService, EmailServiceFactory, EmailServiceRegistry};
pub use error::{EmailError, Result};
