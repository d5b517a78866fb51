use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::BackofficeError;

/// Top-level configuration.
///
/// Every field has a default, so an empty JSON object (`{}`) is a valid
/// configuration and partial files only override what they name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackofficeConfig {
    /// Layout and labels of the generated invoice PDF.
    pub report: ReportConfig,
    /// Role names and the permissions they grant.
    pub roles: RoleCatalog,
}

impl BackofficeConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, BackofficeError> {
        serde_json::from_str(json).map_err(|e| BackofficeError::Config(e.to_string()))
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BackofficeError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            BackofficeError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), roles = config.roles.len(), "configuration loaded");
        Ok(config)
    }
}

/// Settings for the invoice report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Title printed at the top of the first page.
    pub title: String,
    /// Base name of the download when the source file has no usable name.
    pub default_base_name: String,
    /// Shown in the `Bestand` field when the source file name is empty.
    pub unknown_file_label: String,
    /// RGB fill of the table head row.
    pub head_fill: [u8; 3],
    /// Font size of the table body, in points.
    pub body_font_size: f32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Peppol UBL factuur".to_string(),
            default_base_name: "peppol-factuur".to_string(),
            unknown_file_label: "Onbekend".to_string(),
            head_fill: [180, 31, 31],
            body_font_size: 10.0,
        }
    }
}

/// A capability a role can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Create, edit and delete purchase requests.
    ManagePurchaseRequests,
    /// Set a purchase request to Approved or Disapproved.
    ApprovePurchaseRequests,
    /// Create, edit and delete purchase request lists.
    ManagePurchaseRequestLists,
    /// Assign roles to users and delete users.
    ManageUsers,
    /// Use the Peppol reader.
    ReadPeppolInvoices,
}

impl Permission {
    pub const ALL: [Permission; 5] = [
        Permission::ManagePurchaseRequests,
        Permission::ApprovePurchaseRequests,
        Permission::ManagePurchaseRequestLists,
        Permission::ManageUsers,
        Permission::ReadPeppolInvoices,
    ];
}

/// Role name → granted permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleCatalog(BTreeMap<String, Vec<Permission>>);

impl Default for RoleCatalog {
    fn default() -> Self {
        use Permission::*;
        let mut roles = BTreeMap::new();
        roles.insert("Admin".to_string(), Permission::ALL.to_vec());
        roles.insert(
            "Manager".to_string(),
            vec![
                ManagePurchaseRequests,
                ApprovePurchaseRequests,
                ManagePurchaseRequestLists,
                ReadPeppolInvoices,
            ],
        );
        roles.insert(
            "Purchaser".to_string(),
            vec![ManagePurchaseRequests, ManagePurchaseRequestLists],
        );
        roles.insert("Accounting".to_string(), vec![ReadPeppolInvoices]);
        Self(roles)
    }
}

impl RoleCatalog {
    /// An empty catalogue.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Add or replace a role.
    pub fn with_role(mut self, name: impl Into<String>, permissions: Vec<Permission>) -> Self {
        self.0.insert(name.into(), permissions);
        self
    }

    /// Role names in alphabetical order, as offered on the user edit form.
    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `role` is part of the catalogue.
    pub fn contains(&self, role: &str) -> bool {
        self.0.contains_key(role)
    }

    /// Whether any of `roles` grants `permission`. Unknown role names grant nothing.
    pub fn grants<S: AsRef<str>>(&self, roles: &[S], permission: Permission) -> bool {
        roles.iter().any(|role| {
            self.0
                .get(role.as_ref())
                .is_some_and(|perms| perms.contains(&permission))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = BackofficeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, BackofficeConfig::default());
        assert_eq!(config.report.default_base_name, "peppol-factuur");
        assert_eq!(config.report.head_fill, [180, 31, 31]);
    }

    #[test]
    fn partial_report_section_keeps_other_defaults() {
        let config =
            BackofficeConfig::from_json_str(r#"{"report": {"title": "Inkoopfactuur"}}"#).unwrap();
        assert_eq!(config.report.title, "Inkoopfactuur");
        assert_eq!(config.report.unknown_file_label, "Onbekend");
        assert!(config.roles.contains("Admin"));
    }

    #[test]
    fn roles_section_replaces_catalogue() {
        let config = BackofficeConfig::from_json_str(
            r#"{"roles": {"Chef": ["approve_purchase_requests"]}}"#,
        )
        .unwrap();
        assert_eq!(config.roles.len(), 1);
        assert!(config.roles.grants(&["Chef"], Permission::ApprovePurchaseRequests));
        assert!(!config.roles.grants(&["Chef"], Permission::ManageUsers));
    }

    #[test]
    fn invalid_json_is_config_error() {
        let err = BackofficeConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, BackofficeError::Config(_)));
    }

    #[test]
    fn unknown_roles_grant_nothing() {
        let catalog = RoleCatalog::default();
        assert!(!catalog.grants(&["Gast"], Permission::ReadPeppolInvoices));
        assert!(catalog.grants(&["Gast", "Accounting"], Permission::ReadPeppolInvoices));
    }
}
