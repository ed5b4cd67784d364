//! Domain models for Mailroom Core

pub mod email;

pub use email::*;
