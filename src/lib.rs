//! # backoffice
//!
//! Hotel back-office library: a Peppol/UBL invoice reader with PDF
//! export, plus purchase requests, purchase request lists and per-hotel
//! user roles on top of a document store.
//!
//! ## Quick Start
//!
//! ```rust
//! # #[cfg(feature = "peppol")]
//! # {
//! use backoffice::peppol;
//!
//! let xml = r#"<Invoice>
//!   <ID>2024-017</ID>
//!   <AccountingSupplierParty><Party><PartyName><Name>Brouwerij Het Anker</Name></PartyName></Party></AccountingSupplierParty>
//!   <AccountingCustomerParty><Party><PartyName><Name>Hotel Aan Zee</Name></PartyName></Party></AccountingCustomerParty>
//!   <LegalMonetaryTotal><PayableAmount currencyID="EUR">242.00</PayableAmount></LegalMonetaryTotal>
//! </Invoice>"#;
//!
//! let summary = peppol::extract(xml).unwrap();
//! assert_eq!(summary.supplier_name, "Brouwerij Het Anker");
//! assert_eq!(summary.customer_name, "Hotel Aan Zee");
//!
//! let report = peppol::generate(&summary, "2024-017.xml");
//! assert_eq!(report.file_name, "2024-017.pdf");
//! assert_eq!(report.rows.len(), 1); // "Geen factuurlijnen gevonden"
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Error type, configuration, session context, route guard |
//! | `peppol` | UBL invoice extraction, report layout, PDF rendering, reader state |
//! | `purchasing` | Document store, purchase requests and lists, users and roles |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "peppol")]
pub mod peppol;

#[cfg(feature = "purchasing")]
pub mod purchasing;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
