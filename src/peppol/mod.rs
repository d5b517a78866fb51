//! Peppol reader: UBL invoice summary extraction and PDF export.
//!
//! An uploaded UBL 2.1 / Peppol BIS 3.0 invoice is reduced to an
//! [`InvoiceSummary`] (header fields plus one row per invoice line) and
//! can be exported as a paginated PDF.
//!
//! Elements are matched by local name only. Issuers do not agree on
//! namespace prefixes (`cbc:`, `cac:`, none at all), so the prefix and
//! the namespace URI are ignored.
//!
//! # Error channels
//!
//! | Input | Result |
//! |-------|--------|
//! | file name not ending in `.xml` | [`BackofficeError::InvalidFile`](crate::core::BackofficeError::InvalidFile) |
//! | content not well-formed XML | [`BackofficeError::MalformedXml`](crate::core::BackofficeError::MalformedXml) |
//! | well-formed but incomplete invoice | `Ok`, missing fields are [`PLACEHOLDER`] |
//!
//! # Example
//!
//! ```
//! use backoffice::peppol::{self, PeppolReader};
//!
//! let xml = r#"<Invoice xmlns:cbc="urn:cbc"><cbc:ID>F-1</cbc:ID></Invoice>"#;
//! let summary = peppol::extract(xml).unwrap();
//! assert_eq!(summary.invoice_number, "F-1");
//! assert_eq!(summary.currency, "EUR");
//!
//! let mut reader = PeppolReader::default();
//! reader.select_text("f-1.xml", xml).unwrap();
//! let pdf = reader.download().unwrap().unwrap();
//! assert_eq!(pdf.file_name, "f-1.pdf");
//! ```

mod extract;
mod pdf;
mod reader;
mod report;
mod xml_tree;

pub use extract::{InvoiceSummary, LineItem, extract};
pub use pdf::{RenderedReport, render_pdf};
pub use reader::{LoadedInvoice, PeppolReader, is_xml_file_name};
pub use report::{
    NO_LINES_MESSAGE, Report, ReportField, TABLE_HEAD, base_name, generate, generate_with,
    output_file_name,
};
pub use xml_tree::{Element, XmlDocument};

/// Value of any summary field whose element is missing or blank.
pub const PLACEHOLDER: &str = "-";

/// Currency used when the payable amount carries no `currencyID`.
pub const DEFAULT_CURRENCY: &str = "EUR";
