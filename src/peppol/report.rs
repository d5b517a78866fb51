use std::fmt;

use serde::Serialize;

use super::extract::InvoiceSummary;
use crate::core::ReportConfig;

/// Column headers of the line table.
pub const TABLE_HEAD: [&str; 5] = ["#", "Lijn ID", "Omschrijving", "Aantal", "Lijnbedrag"];

/// Description shown in the single row of an invoice without lines.
pub const NO_LINES_MESSAGE: &str = "Geen factuurlijnen gevonden";

/// A labelled value in the report header block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportField {
    pub label: &'static str,
    pub value: String,
}

/// A laid-out invoice report, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    /// Header block, top to bottom.
    pub fields: Vec<ReportField>,
    /// Table body; never empty.
    pub rows: Vec<[String; 5]>,
    /// Name of the file offered for download.
    pub file_name: String,
    /// RGB fill of the table head.
    pub head_fill: [u8; 3],
    /// Table body font size in points.
    pub body_font_size: f32,
}

/// Lay out `summary` with the default [`ReportConfig`].
pub fn generate(summary: &InvoiceSummary, source_file_name: &str) -> Report {
    generate_with(summary, source_file_name, &ReportConfig::default())
}

/// Lay out `summary` for the upload named `source_file_name`.
///
/// Line amounts get the invoice currency appended here; the summary
/// itself keeps them bare.
pub fn generate_with(
    summary: &InvoiceSummary,
    source_file_name: &str,
    config: &ReportConfig,
) -> Report {
    let source_label = if source_file_name.is_empty() {
        config.unknown_file_label.clone()
    } else {
        source_file_name.to_string()
    };

    let fields = vec![
        ReportField {
            label: "Bestand",
            value: source_label,
        },
        ReportField {
            label: "Factuurnummer",
            value: summary.invoice_number.clone(),
        },
        ReportField {
            label: "Factuurdatum",
            value: summary.issue_date.clone(),
        },
        ReportField {
            label: "Vervaldatum",
            value: summary.due_date.clone(),
        },
        ReportField {
            label: "Leverancier",
            value: summary.supplier_name.clone(),
        },
        ReportField {
            label: "Klant",
            value: summary.customer_name.clone(),
        },
        ReportField {
            label: "Totaal te betalen",
            value: format!("{} {}", summary.payable_amount, summary.currency),
        },
    ];

    let rows = if summary.invoice_lines.is_empty() {
        vec![[
            "-".to_string(),
            "-".to_string(),
            NO_LINES_MESSAGE.to_string(),
            "-".to_string(),
            "-".to_string(),
        ]]
    } else {
        summary
            .invoice_lines
            .iter()
            .map(|line| {
                [
                    line.index.to_string(),
                    line.line_id.clone(),
                    line.item_name.clone(),
                    line.quantity.clone(),
                    format!("{} {}", line.line_amount, summary.currency),
                ]
            })
            .collect()
    };

    Report {
        title: config.title.clone(),
        fields,
        rows,
        file_name: output_file_name_with(source_file_name, &config.default_base_name),
        head_fill: config.head_fill,
        body_font_size: config.body_font_size,
    }
}

/// Base name of the download: the upload name without a trailing `.xml`
/// (any case), or `default_base` when nothing remains.
pub fn base_name<'a>(source_file_name: &'a str, default_base: &'a str) -> &'a str {
    let base = match source_file_name.len().checked_sub(4) {
        Some(cut)
            if source_file_name.is_char_boundary(cut)
                && source_file_name[cut..].eq_ignore_ascii_case(".xml") =>
        {
            &source_file_name[..cut]
        }
        _ => source_file_name,
    };
    if base.is_empty() { default_base } else { base }
}

/// `<base>.pdf` for the upload named `source_file_name`.
pub fn output_file_name(source_file_name: &str) -> String {
    output_file_name_with(source_file_name, &ReportConfig::default().default_base_name)
}

fn output_file_name_with(source_file_name: &str, default_base: &str) -> String {
    format!("{}.pdf", base_name(source_file_name, default_base))
}

/// Plain-text rendering: title, header fields, then the table with
/// cells separated by ` | `.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for field in &self.fields {
            writeln!(f, "{}: {}", field.label, field.value)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", TABLE_HEAD.join(" | "))?;
        for row in &self.rows {
            writeln!(f, "{}", row.join(" | "))?;
        }
        Ok(())
    }
}
