//! Attachment resolution: turns a request's attachment descriptor into
//! content bound to the composed message

use super::content_type::content_type_for;
use crate::domain::{AttachmentContent, AttachmentSource, EmailAttachment, MessageAttachment};
use crate::error::{EmailError, Result};
use lettre::message::header::ContentType;

/// Resolve one attachment.
///
/// Path sources must point at an existing file and are read later, when the
/// message is serialized. Their name and content type always come from the
/// path itself. Byte and stream sources require a file name.
/// Stream content is read here, after rewinding seekable streams.
pub fn resolve_attachment(attachment: &mut EmailAttachment) -> Result<MessageAttachment> {
    let file_name = attachment
        .file_name
        .as_deref()
        .filter(|name| !name.trim().is_empty());
    let content_type_override = attachment.content_type.as_deref();

    match attachment.source.as_mut() {
        Some(AttachmentSource::Path(path)) => {
            if !path.is_file() {
                return Err(EmailError::AttachmentNotFound(path.clone()));
            }

            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let content_type = content_type_for(&file_name).to_string();

            Ok(MessageAttachment {
                file_name,
                content_type,
                content: AttachmentContent::File(path.clone()),
            })
        }
        Some(AttachmentSource::Bytes(bytes)) if !bytes.is_empty() => {
            let file_name = file_name.ok_or_else(|| {
                EmailError::InvalidAttachment(
                    "FileName is required when using FileBytes".to_string(),
                )
            })?;
            let content_type = effective_content_type(content_type_override, file_name)?;

            Ok(MessageAttachment {
                file_name: file_name.to_string(),
                content_type,
                content: AttachmentContent::Bytes(bytes.clone()),
            })
        }
        Some(AttachmentSource::Stream(stream)) => {
            let file_name = file_name.ok_or_else(|| {
                EmailError::InvalidAttachment(
                    "FileName is required when using FileStream".to_string(),
                )
            })?;
            let content_type = effective_content_type(content_type_override, file_name)?;
            let content = stream.read_all()?;

            Ok(MessageAttachment {
                file_name: file_name.to_string(),
                content_type,
                content: AttachmentContent::Bytes(content),
            })
        }
        _ => Err(EmailError::InvalidAttachment(
            "Attachment must have either FilePath, FileBytes, or FileStream".to_string(),
        )),
    }
}

fn effective_content_type(content_type: Option<&str>, file_name: &str) -> Result<String> {
    match content_type.filter(|ct| !ct.trim().is_empty()) {
        Some(ct) => {
            ContentType::parse(ct).map_err(|e| {
                EmailError::InvalidAttachment(format!("Invalid content type '{}': {}", ct, e))
            })?;
            Ok(ct.to_string())
        }
        None => Ok(content_type_for(file_name).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AttachmentStream;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};
    use std::path::PathBuf;

    #[test]
    fn test_bytes_attachment_uses_extension() {
        let mut attachment = EmailAttachment::from_bytes("testFile1.pdf", b"byte array".to_vec());

        let resolved = resolve_attachment(&mut attachment).unwrap();
        assert_eq!(resolved.file_name, "testFile1.pdf");
        assert_eq!(resolved.content_type, "application/pdf");
        assert_eq!(
            resolved.content,
            AttachmentContent::Bytes(b"byte array".to_vec())
        );
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let mut attachment = EmailAttachment::from_bytes("testFile1.pdf", b"{}".to_vec())
            .with_content_type("application/json");

        let resolved = resolve_attachment(&mut attachment).unwrap();
        assert_eq!(resolved.content_type, "application/json");
    }

    #[test]
    fn test_blank_content_type_falls_back_to_extension() {
        let mut attachment =
            EmailAttachment::from_bytes("testFile1.txt", b"text".to_vec()).with_content_type(" ");

        let resolved = resolve_attachment(&mut attachment).unwrap();
        assert_eq!(resolved.content_type, "text/plain");
    }

    #[test]
    fn test_invalid_content_type_rejected() {
        let mut attachment = EmailAttachment::from_bytes("testFile1.txt", b"text".to_vec())
            .with_content_type("not a mime type");

        let err = resolve_attachment(&mut attachment).unwrap_err();
        assert!(matches!(err, EmailError::InvalidAttachment(_)));
    }

    #[test]
    fn test_bytes_without_file_name() {
        let mut attachment = EmailAttachment {
            source: Some(AttachmentSource::Bytes(b"byte array".to_vec())),
            ..Default::default()
        };

        let err = resolve_attachment(&mut attachment).unwrap_err();
        assert_eq!(err.to_string(), "FileName is required when using FileBytes");
    }

    #[test]
    fn test_stream_without_file_name() {
        let mut attachment = EmailAttachment {
            file_name: Some("  ".to_string()),
            source: Some(AttachmentSource::Stream(AttachmentStream::Seekable(
                Box::new(Cursor::new(Vec::new())),
            ))),
            ..Default::default()
        };

        let err = resolve_attachment(&mut attachment).unwrap_err();
        assert_eq!(err.to_string(), "FileName is required when using FileStream");
    }

    #[test]
    fn test_empty_stream_is_allowed() {
        let mut attachment = EmailAttachment::from_reader("testFile1.pdf", Cursor::new(Vec::new()));

        let resolved = resolve_attachment(&mut attachment).unwrap();
        assert_eq!(resolved.content_type, "application/pdf");
        assert_eq!(resolved.content, AttachmentContent::Bytes(Vec::new()));
    }

    #[test]
    fn test_seekable_stream_is_rewound() {
        let mut cursor = Cursor::new(b"stream body".to_vec());
        cursor.set_position(7);
        let mut attachment = EmailAttachment::from_reader("body.txt", cursor);

        let first = resolve_attachment(&mut attachment).unwrap();
        let second = resolve_attachment(&mut attachment).unwrap();
        assert_eq!(first.content, AttachmentContent::Bytes(b"stream body".to_vec()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_file_backed_stream_is_reread() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"a,b\n1,2\n").unwrap();
        let mut attachment = EmailAttachment::from_reader("data.csv", file);

        let first = resolve_attachment(&mut attachment).unwrap();
        let second = resolve_attachment(&mut attachment).unwrap();
        assert_eq!(first.content_type, "text/csv");
        assert_eq!(first.content, AttachmentContent::Bytes(b"a,b\n1,2\n".to_vec()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_file() {
        let path = PathBuf::from("/some/path/that/does/not/exist/file.txt");
        let mut attachment = EmailAttachment::from_path(&path);

        let err = resolve_attachment(&mut attachment).unwrap_err();
        assert!(matches!(err, EmailError::AttachmentNotFound(ref p) if p == &path));
        assert_eq!(
            err.to_string(),
            "File not found: /some/path/that/does/not/exist/file.txt"
        );
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut attachment = EmailAttachment::from_path(dir.path());

        let err = resolve_attachment(&mut attachment).unwrap_err();
        assert!(matches!(err, EmailError::AttachmentNotFound(_)));
    }

    #[test]
    fn test_existing_file_binds_path() {
        let mut file = tempfile::Builder::new()
            .prefix("report")
            .suffix(".pdf")
            .tempfile()
            .unwrap();
        file.write_all(b"%PDF-1.4").unwrap();

        let mut attachment = EmailAttachment::from_path(file.path());
        let resolved = resolve_attachment(&mut attachment).unwrap();

        let expected_name = file.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(resolved.file_name, expected_name);
        assert_eq!(resolved.content_type, "application/pdf");
        assert_eq!(
            resolved.content,
            AttachmentContent::File(file.path().to_path_buf())
        );
    }

    #[test]
    fn test_existing_file_ignores_name_and_type_overrides() {
        let file = tempfile::Builder::new()
            .prefix("report")
            .suffix(".pdf")
            .tempfile()
            .unwrap();

        let mut attachment = EmailAttachment::from_path(file.path())
            .with_file_name("other.zip")
            .with_content_type("application/zip");
        let resolved = resolve_attachment(&mut attachment).unwrap();

        let expected_name = file.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(resolved.file_name, expected_name);
        assert_eq!(resolved.content_type, "application/pdf");
    }

    #[test]
    fn test_no_source() {
        let mut attachment = EmailAttachment::default();

        let err = resolve_attachment(&mut attachment).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attachment must have either FilePath, FileBytes, or FileStream"
        );
    }

    #[test]
    fn test_empty_bytes_counts_as_no_source() {
        let mut attachment = EmailAttachment::from_bytes("empty.txt", Vec::new());

        let err = resolve_attachment(&mut attachment).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attachment must have either FilePath, FileBytes, or FileStream"
        );
    }
}
