use serde::{Deserialize, Serialize};

use super::xml_tree::{Element, XmlDocument};
use super::{DEFAULT_CURRENCY, PLACEHOLDER};
use crate::core::BackofficeError;

/// Flat summary of a UBL/Peppol invoice.
///
/// All values are the literal (trimmed) element text; nothing is parsed
/// into dates or numbers. Missing values are [`PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    /// First `ID` in the document.
    pub invoice_number: String,
    pub issue_date: String,
    pub due_date: String,
    /// `Name` inside `AccountingSupplierParty`.
    pub supplier_name: String,
    /// `Name` inside `AccountingCustomerParty`.
    pub customer_name: String,
    /// `PayableAmount` inside `LegalMonetaryTotal`.
    pub payable_amount: String,
    /// `currencyID` of the payable amount, [`DEFAULT_CURRENCY`] when absent.
    pub currency: String,
    /// One entry per `InvoiceLine`, in document order.
    pub invoice_lines: Vec<LineItem>,
}

/// One `InvoiceLine` of the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// 1-based position in the document.
    pub index: usize,
    pub line_id: String,
    pub item_name: String,
    /// `"<value> <unitCode>"`, or just the value when there is no unit.
    pub quantity: String,
    /// Line net amount without currency.
    pub line_amount: String,
}

/// Trimmed text of `element`, or the placeholder when it is missing or blank.
fn text_or_placeholder(element: Option<Element<'_>>) -> String {
    element
        .map(|e| e.text_content().trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// First descendant of `scope` named `local_name`; a missing scope finds nothing.
fn first_in<'a>(scope: Option<Element<'a>>, local_name: &str) -> Option<Element<'a>> {
    scope.and_then(|s| s.find_first(local_name))
}

/// Extract an [`InvoiceSummary`] from UBL/Peppol invoice XML.
///
/// Elements are matched by local name, so any namespace prefix works.
/// Only well-formedness is checked: a document missing every invoice
/// element still yields a summary made of placeholders.
///
/// # Errors
///
/// [`BackofficeError::MalformedXml`] when `xml` is not well-formed.
pub fn extract(xml: &str) -> Result<InvoiceSummary, BackofficeError> {
    let doc = XmlDocument::parse(xml).inspect_err(|e| {
        if let BackofficeError::MalformedXml { detail } = e {
            tracing::warn!(%detail, "rejected malformed invoice XML");
        }
    })?;

    let supplier_party = doc.find_first("AccountingSupplierParty");
    let customer_party = doc.find_first("AccountingCustomerParty");
    let monetary_total = doc.find_first("LegalMonetaryTotal");
    let payable = first_in(monetary_total, "PayableAmount");

    let currency = payable
        .and_then(|p| p.attribute("currencyID"))
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_string();

    let invoice_lines: Vec<LineItem> = doc
        .find_all("InvoiceLine")
        .into_iter()
        .enumerate()
        .map(|(i, line)| extract_line(i + 1, line))
        .collect();

    let summary = InvoiceSummary {
        invoice_number: text_or_placeholder(doc.find_first("ID")),
        issue_date: text_or_placeholder(doc.find_first("IssueDate")),
        due_date: text_or_placeholder(doc.find_first("DueDate")),
        supplier_name: text_or_placeholder(first_in(supplier_party, "Name")),
        customer_name: text_or_placeholder(first_in(customer_party, "Name")),
        payable_amount: text_or_placeholder(payable),
        currency,
        invoice_lines,
    };

    tracing::debug!(
        invoice_number = %summary.invoice_number,
        lines = summary.invoice_lines.len(),
        "invoice extracted"
    );
    Ok(summary)
}

fn extract_line(index: usize, line: Element<'_>) -> LineItem {
    let quantity_node = line.find_first("InvoicedQuantity");
    let value = text_or_placeholder(quantity_node);
    let quantity = match quantity_node.and_then(|q| q.attribute("unitCode")) {
        Some(unit) if !unit.is_empty() => format!("{value} {unit}"),
        _ => value,
    };

    LineItem {
        index,
        line_id: text_or_placeholder(line.find_first("ID")),
        item_name: text_or_placeholder(line.find_first("Name")),
        quantity,
        line_amount: text_or_placeholder(line.find_first("LineExtensionAmount")),
    }
}
