use std::path::PathBuf;

use backoffice::peppol::PeppolReader;
use backoffice::{BackofficeConfig, BackofficeError};
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns:cac="urn:cac" xmlns:cbc="urn:cbc">
  <cbc:ID>2024-017</cbc:ID>
  <cbc:IssueDate>2024-05-02</cbc:IssueDate>
  <cbc:DueDate>2024-06-01</cbc:DueDate>
  <cac:AccountingSupplierParty><cac:Party><cac:PartyName><cbc:Name>Brouwerij Het Anker</cbc:Name></cac:PartyName></cac:Party></cac:AccountingSupplierParty>
  <cac:AccountingCustomerParty><cac:Party><cac:PartyName><cbc:Name>Hotel Aan Zee</cbc:Name></cac:PartyName></cac:Party></cac:AccountingCustomerParty>
  <cac:LegalMonetaryTotal><cbc:PayableAmount currencyID="EUR">242.00</cbc:PayableAmount></cac:LegalMonetaryTotal>
  <cac:InvoiceLine>
    <cbc:ID>1</cbc:ID>
    <cbc:InvoicedQuantity unitCode="C62">4</cbc:InvoicedQuantity>
    <cbc:LineExtensionAmount currencyID="EUR">200.00</cbc:LineExtensionAmount>
    <cac:Item><cbc:Name>Fust Gouden Carolus 20L</cbc:Name></cac:Item>
  </cac:InvoiceLine>
</Invoice>"#;

fn main() -> Result<(), BackofficeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Usage: peppol_reader [invoice.xml] [config.json]
    let mut args = std::env::args().skip(1);
    let input = args.next().map(PathBuf::from);
    let config = match args.next() {
        Some(path) => BackofficeConfig::load(path)?,
        None => BackofficeConfig::default(),
    };

    let mut reader = PeppolReader::new(config.report);
    let outcome = match &input {
        Some(path) => reader.select_path(path).map(|_| ()),
        None => reader.select_text("voorbeeld.xml", SAMPLE).map(|_| ()),
    };
    if let Err(e) = outcome {
        println!("{}", reader.error_message().unwrap_or("Kon het bestand niet verwerken."));
        return Err(e);
    }

    let Some(report) = reader.report() else {
        return Ok(());
    };
    println!("{report}");

    let rendered = report.render()?;
    std::fs::write(&rendered.file_name, &rendered.bytes)?;
    println!("PDF geschreven: {} ({} bytes)", rendered.file_name, rendered.bytes.len());
    Ok(())
}
