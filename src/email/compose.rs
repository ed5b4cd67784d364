//! Message composition: validates a request and merges it with the
//! service configuration

use super::addresses::{merge_addresses, non_blank};
use super::attachment::resolve_attachment;
use crate::domain::{EmailAddress, EmailMessage, EmailRequest, EmailServiceOptions};
use crate::error::{EmailError, Result};

/// Compose the outgoing message for `request`.
///
/// Validation runs before anything else: at least one non-blank To address,
/// then a non-blank subject. Cc and Bcc are the configured defaults merged
/// with the request's lists. Attachments resolve in request order and the
/// first failure aborts composition.
pub fn compose(options: &EmailServiceOptions, request: &mut EmailRequest) -> Result<EmailMessage> {
    let to = non_blank(&request.to_emails);
    if to.is_empty() {
        return Err(EmailError::InvalidRequest(
            "No email 'To' addresses have been provided.".to_string(),
        ));
    }

    if request.subject.trim().is_empty() {
        return Err(EmailError::InvalidRequest(
            "The email request must have a subject.".to_string(),
        ));
    }

    let from = match options.from_name.trim() {
        "" => EmailAddress::new(checked(&options.from)?),
        name => EmailAddress::with_name(checked(&options.from)?, name),
    };

    let to = addresses(&to)?;
    let cc = addresses(&merge_addresses(
        &options.cc_email_addresses,
        &request.cc_emails,
    ))?;
    let bcc = addresses(&merge_addresses(
        &options.bcc_email_addresses,
        &request.bcc_emails,
    ))?;

    let attachments = request
        .attachments
        .iter_mut()
        .map(resolve_attachment)
        .collect::<Result<Vec<_>>>()?;

    Ok(EmailMessage {
        from,
        to,
        cc,
        bcc,
        subject: request.subject.clone(),
        html_body: request.html_body.clone(),
        text_body: request.text_body.clone(),
        attachments,
    })
}

fn addresses(list: &[String]) -> Result<Vec<EmailAddress>> {
    list.iter()
        .map(|address| checked(address).map(EmailAddress::new))
        .collect()
}

fn checked(address: &str) -> Result<String> {
    address
        .trim()
        .parse::<lettre::Address>()
        .map(|_| address.trim().to_string())
        .map_err(|_| EmailError::InvalidRequest(format!("Invalid email address: {}", address)))
}
