use thiserror::Error;

/// User-facing message for uploads that are not `.xml` files.
pub const INVALID_FILE_MESSAGE: &str = "Upload een XML-bestand in UBL/Peppol formaat.";

/// User-facing message for uploads that are not well-formed XML.
pub const MALFORMED_XML_MESSAGE: &str = "Het XML-bestand is ongeldig en kon niet gelezen worden.";

/// Errors that can occur in the back-office services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackofficeError {
    /// Uploaded file was rejected before its content was read.
    #[error("Upload een XML-bestand in UBL/Peppol formaat.")]
    InvalidFile {
        /// Name of the rejected file.
        file_name: String,
    },

    /// Uploaded content is not well-formed XML. `detail` carries the
    /// parser diagnostic; the display text is the fixed user message.
    #[error("Het XML-bestand is ongeldig en kon niet gelezen worden.")]
    MalformedXml { detail: String },

    /// PDF generation failed.
    #[error("render error: {0}")]
    Render(String),

    /// Reading an upload from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// One or more required fields are missing.
    #[error("{0}")]
    Validation(String),

    /// A record addressed by id does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    Unauthenticated,

    /// The document store rejected or could not decode a record.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}

impl BackofficeError {
    /// Whether this error came from the upload checks (file type or XML
    /// well-formedness) rather than from the services.
    pub fn is_upload_error(&self) -> bool {
        matches!(self, Self::InvalidFile { .. } | Self::MalformedXml { .. })
    }
}

/// A single required-field failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending field (e.g. "title").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Fold a list of field failures into a single error, or `Ok` when empty.
pub fn into_result(errors: Vec<ValidationError>) -> Result<(), BackofficeError> {
    if errors.is_empty() {
        return Ok(());
    }
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(BackofficeError::Validation(joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_errors_display_fixed_messages() {
        let err = BackofficeError::MalformedXml {
            detail: "unexpected end of file".into(),
        };
        assert_eq!(err.to_string(), MALFORMED_XML_MESSAGE);
        assert!(err.is_upload_error());

        let err = BackofficeError::InvalidFile {
            file_name: "factuur.pdf".into(),
        };
        assert_eq!(err.to_string(), INVALID_FILE_MESSAGE);
        assert!(err.is_upload_error());
        assert!(!BackofficeError::Unauthenticated.is_upload_error());
    }

    #[test]
    fn into_result_joins_messages() {
        assert!(into_result(Vec::new()).is_ok());
        let err = into_result(vec![
            ValidationError::new("title", "is required"),
            ValidationError::new("required_delivery_date", "is required"),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "title: is required; required_delivery_date: is required"
        );
    }
}
