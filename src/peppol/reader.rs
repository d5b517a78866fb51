use std::path::Path;

use super::extract::{InvoiceSummary, extract};
use super::pdf::RenderedReport;
use super::report::{Report, generate_with};
use crate::core::{BackofficeError, ReportConfig};

/// Whether `file_name` ends in `.xml`, ignoring case.
pub fn is_xml_file_name(file_name: &str) -> bool {
    let len = file_name.len();
    len >= 4
        && file_name.is_char_boundary(len - 4)
        && file_name[len - 4..].eq_ignore_ascii_case(".xml")
}

/// A successfully extracted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedInvoice {
    pub file_name: String,
    pub summary: InvoiceSummary,
}

/// State of the Peppol reader page.
///
/// Every upload replaces the previous result entirely, whether it
/// succeeds or fails; at most one of the loaded invoice and the error
/// message is set.
#[derive(Debug, Clone, Default)]
pub struct PeppolReader {
    config: ReportConfig,
    loaded: Option<LoadedInvoice>,
    error: Option<String>,
}

impl PeppolReader {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            loaded: None,
            error: None,
        }
    }

    pub fn loaded(&self) -> Option<&LoadedInvoice> {
        self.loaded.as_ref()
    }

    /// The extracted summary of the current upload, if any.
    pub fn summary(&self) -> Option<&InvoiceSummary> {
        self.loaded.as_ref().map(|l| &l.summary)
    }

    /// Name of the current upload, if it was extracted.
    pub fn selected_file_name(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.file_name.as_str())
    }

    /// The message shown for the last rejected upload.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Clear the page, as when the file selection is cancelled.
    pub fn clear(&mut self) {
        self.loaded = None;
        self.error = None;
    }

    /// Handle a file selection. `read` produces the file content and is
    /// only called once the name has passed the `.xml` check.
    pub fn select_file<F>(
        &mut self,
        file_name: &str,
        read: F,
    ) -> Result<&InvoiceSummary, BackofficeError>
    where
        F: FnOnce() -> std::io::Result<String>,
    {
        self.clear();

        if !is_xml_file_name(file_name) {
            tracing::info!(%file_name, "upload rejected: not an XML file");
            return Err(self.fail(BackofficeError::InvalidFile {
                file_name: file_name.to_string(),
            }));
        }

        let summary = match read().map_err(BackofficeError::from).and_then(|xml| extract(&xml)) {
            Ok(summary) => summary,
            Err(e) => return Err(self.fail(e)),
        };

        tracing::info!(%file_name, lines = summary.invoice_lines.len(), "upload accepted");
        let loaded = self.loaded.insert(LoadedInvoice {
            file_name: file_name.to_string(),
            summary,
        });
        Ok(&loaded.summary)
    }

    /// Handle the selection of content already in memory.
    pub fn select_text(
        &mut self,
        file_name: &str,
        xml: &str,
    ) -> Result<&InvoiceSummary, BackofficeError> {
        self.select_file(file_name, || Ok(xml.to_string()))
    }

    /// Handle the selection of a file on disk.
    pub fn select_path(&mut self, path: &Path) -> Result<&InvoiceSummary, BackofficeError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.select_file(&file_name, || std::fs::read_to_string(path))
    }

    /// Lay out the current upload, or `None` when nothing is loaded.
    pub fn report(&self) -> Option<Report> {
        self.loaded
            .as_ref()
            .map(|l| generate_with(&l.summary, &l.file_name, &self.config))
    }

    /// Render the current upload as a PDF download, or `None` when
    /// nothing is loaded.
    pub fn download(&self) -> Option<Result<RenderedReport, BackofficeError>> {
        self.report().map(|report| report.render())
    }

    fn fail(&mut self, error: BackofficeError) -> BackofficeError {
        let message = match &error {
            BackofficeError::InvalidFile { .. } | BackofficeError::MalformedXml { .. } => {
                error.to_string()
            }
            _ => "Kon het bestand niet verwerken.".to_string(),
        };
        self.error = Some(message);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_extension_check() {
        assert!(is_xml_file_name("a.xml"));
        assert!(is_xml_file_name("A.XmL"));
        assert!(is_xml_file_name(".xml"));
        assert!(!is_xml_file_name("xml"));
        assert!(!is_xml_file_name("a.xml.pdf"));
        assert!(!is_xml_file_name("aéxml"));
    }

    #[test]
    fn wrong_extension_never_reads_content() {
        let mut reader = PeppolReader::default();
        let err = reader
            .select_file("factuur.pdf", || panic!("content must not be read"))
            .unwrap_err();
        assert!(matches!(err, BackofficeError::InvalidFile { .. }));
        assert_eq!(
            reader.error_message(),
            Some("Upload een XML-bestand in UBL/Peppol formaat.")
        );
        assert!(reader.download().is_none());
    }

    #[test]
    fn read_failure_uses_generic_message() {
        let mut reader = PeppolReader::default();
        let err = reader
            .select_file("f.xml", || {
                Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "bad utf-8"))
            })
            .unwrap_err();
        assert!(matches!(err, BackofficeError::Io(_)));
        assert_eq!(reader.error_message(), Some("Kon het bestand niet verwerken."));
    }

    #[test]
    fn clear_resets_state() {
        let mut reader = PeppolReader::default();
        reader.select_text("f.xml", "<Invoice/>").unwrap();
        assert_eq!(reader.selected_file_name(), Some("f.xml"));
        reader.clear();
        assert!(reader.loaded().is_none());
        assert!(reader.error_message().is_none());
    }
}
