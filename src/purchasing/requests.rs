use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::items::{PurchaseItem, PurchaseItemInput};
use super::lists::PurchaseRequestList;
use super::store::{DocumentStore, StoredDocument, encode, purchase_requests_collection};
use crate::core::{BackofficeError, SessionContext, ValidationError, into_result};

const HOTEL_REQUIRED: &str = "Hotel uid is verplicht";
const HOTEL_AND_ID_REQUIRED: &str = "Hotel uid en requestId zijn verplicht";

/// Approval state of a purchase request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum RequestStatus {
    #[default]
    Created,
    Approved,
    Disapproved,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Created => "Created",
            RequestStatus::Approved => "Approved",
            RequestStatus::Disapproved => "Disapproved",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Missing, empty or unrecognised values read as `Created`.
impl<'de> Deserialize<'de> for RequestStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some("Approved") => RequestStatus::Approved,
            Some("Disapproved") => RequestStatus::Disapproved,
            _ => RequestStatus::Created,
        })
    }
}

/// The user asked to approve a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    pub user_id: String,
    pub name: String,
}

/// Stored shape of a purchase request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PurchaseRequestRecord {
    title: String,
    required_delivery_date: String,
    items: Vec<PurchaseItem>,
    status: RequestStatus,
    status_note: String,
    approver_user_id: String,
    approver_name: String,
}

/// Fields written by an edit; status and note are left alone.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PurchaseRequestEdit<'a> {
    title: &'a str,
    required_delivery_date: &'a str,
    items: Vec<PurchaseItem>,
    approver_user_id: &'a str,
    approver_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusChange<'a> {
    status: RequestStatus,
    status_note: &'a str,
}

/// A purchase request as shown in the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseRequest {
    pub id: String,
    pub title: String,
    /// Date as entered (`YYYY-MM-DD`), not parsed.
    pub required_delivery_date: String,
    pub items: Vec<PurchaseItem>,
    pub status: RequestStatus,
    pub status_note: String,
    pub approver_user_id: String,
    pub approver_name: String,
    pub created_at: DateTime<Utc>,
}

impl PurchaseRequest {
    fn from_document(doc: &StoredDocument) -> Result<Self, BackofficeError> {
        let record: PurchaseRequestRecord = doc.decode()?;
        Ok(Self {
            id: doc.id.clone(),
            title: record.title,
            required_delivery_date: record.required_delivery_date,
            items: record.items,
            status: record.status,
            status_note: record.status_note,
            approver_user_id: record.approver_user_id,
            approver_name: record.approver_name,
            created_at: doc.created_at,
        })
    }

    /// The selected approver, if one was chosen.
    pub fn approver(&self) -> Option<Approver> {
        (!self.approver_user_id.is_empty()).then(|| Approver {
            user_id: self.approver_user_id.clone(),
            name: self.approver_name.clone(),
        })
    }

    /// Sum of the item net totals.
    pub fn net_total(&self) -> Decimal {
        self.items.iter().map(PurchaseItem::net_total).sum()
    }

    /// Sum of the item gross totals.
    pub fn gross_total(&self) -> Decimal {
        self.items.iter().map(PurchaseItem::gross_total).sum()
    }
}

/// Form state for creating or editing a purchase request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequestDraft {
    pub title: String,
    pub required_delivery_date: String,
    pub items: Vec<PurchaseItemInput>,
    pub approver: Option<Approver>,
}

impl Default for PurchaseRequestDraft {
    /// A new form starts with one empty item row.
    fn default() -> Self {
        Self {
            title: String::new(),
            required_delivery_date: String::new(),
            items: vec![PurchaseItemInput::default()],
            approver: None,
        }
    }
}

impl PurchaseRequestDraft {
    pub fn new(title: impl Into<String>, required_delivery_date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            required_delivery_date: required_delivery_date.into(),
            ..Self::default()
        }
    }

    /// A draft prefilled with the items of a purchase request list.
    pub fn from_list(list: &PurchaseRequestList) -> Self {
        let items = if list.items.is_empty() {
            vec![PurchaseItemInput::default()]
        } else {
            list.items.iter().map(PurchaseItemInput::from).collect()
        };
        Self {
            title: list.title.clone(),
            items,
            ..Self::default()
        }
    }

    /// The draft of an existing request, for the edit form.
    pub fn from_request(request: &PurchaseRequest) -> Self {
        Self {
            title: request.title.clone(),
            required_delivery_date: request.required_delivery_date.clone(),
            items: request.items.iter().map(PurchaseItemInput::from).collect(),
            approver: request.approver(),
        }
    }

    pub fn with_approver(mut self, user_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.approver = Some(Approver {
            user_id: user_id.into(),
            name: name.into(),
        });
        self
    }

    /// Append an item row.
    pub fn add_item(&mut self, item: PurchaseItemInput) {
        self.items.push(item);
    }

    /// Remove an item row. Removing the last row leaves one empty row.
    pub fn remove_item(&mut self, index: usize) {
        if index >= self.items.len() {
            return;
        }
        if self.items.len() == 1 {
            self.items = vec![PurchaseItemInput::default()];
        } else {
            self.items.remove(index);
        }
    }

    /// Required-field check: title and delivery date.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(ValidationError::new("title", "is verplicht"));
        }
        if self.required_delivery_date.trim().is_empty() {
            errors.push(ValidationError::new("required_delivery_date", "is verplicht"));
        }
        errors
    }

    fn cleaned_items(&self) -> Vec<PurchaseItem> {
        self.items.iter().map(PurchaseItemInput::clean).collect()
    }

    fn approver_parts(&self) -> (&str, &str) {
        self.approver
            .as_ref()
            .map_or(("", ""), |a| (a.user_id.as_str(), a.name.as_str()))
    }
}

fn hotel_and_id<'a>(
    ctx: &'a SessionContext,
    request_id: &str,
) -> Result<&'a str, BackofficeError> {
    let hotel = ctx.require_hotel(HOTEL_AND_ID_REQUIRED)?;
    if request_id.trim().is_empty() {
        return Err(BackofficeError::Validation(HOTEL_AND_ID_REQUIRED.into()));
    }
    Ok(hotel)
}

/// All purchase requests of the current hotel, newest first. Empty when
/// no hotel is selected.
pub fn list_purchase_requests<S: DocumentStore + ?Sized>(
    store: &S,
    ctx: &SessionContext,
) -> Result<Vec<PurchaseRequest>, BackofficeError> {
    let Some(hotel) = ctx.hotel_uid() else {
        return Ok(Vec::new());
    };
    store
        .list(&purchase_requests_collection(hotel))?
        .iter()
        .map(PurchaseRequest::from_document)
        .collect()
}

/// One purchase request, or `None` when it does not exist or no hotel is
/// selected.
pub fn get_purchase_request<S: DocumentStore + ?Sized>(
    store: &S,
    ctx: &SessionContext,
    request_id: &str,
) -> Result<Option<PurchaseRequest>, BackofficeError> {
    let Some(hotel) = ctx.hotel_uid() else {
        return Ok(None);
    };
    if request_id.is_empty() {
        return Ok(None);
    }
    store
        .get(&purchase_requests_collection(hotel), request_id)?
        .as_ref()
        .map(PurchaseRequest::from_document)
        .transpose()
}

/// Store a new request with status `Created`; returns its id.
pub fn create_purchase_request<S: DocumentStore + ?Sized>(
    store: &mut S,
    ctx: &SessionContext,
    draft: &PurchaseRequestDraft,
) -> Result<String, BackofficeError> {
    let hotel = ctx.require_hotel(HOTEL_REQUIRED)?;
    into_result(draft.validate())?;

    let (approver_user_id, approver_name) = draft.approver_parts();
    let record = PurchaseRequestRecord {
        title: draft.title.trim().to_string(),
        required_delivery_date: draft.required_delivery_date.clone(),
        items: draft.cleaned_items(),
        status: RequestStatus::Created,
        status_note: String::new(),
        approver_user_id: approver_user_id.to_string(),
        approver_name: approver_name.to_string(),
    };
    let id = store.create(&purchase_requests_collection(hotel), encode(&record)?)?;
    tracing::info!(
        hotel_uid = %hotel,
        request_id = %id,
        items = record.items.len(),
        "purchase request created"
    );
    Ok(id)
}

/// Overwrite title, delivery date, items and approver of a request.
pub fn update_purchase_request<S: DocumentStore + ?Sized>(
    store: &mut S,
    ctx: &SessionContext,
    request_id: &str,
    draft: &PurchaseRequestDraft,
) -> Result<(), BackofficeError> {
    let hotel = hotel_and_id(ctx, request_id)?;
    into_result(draft.validate())?;

    let (approver_user_id, approver_name) = draft.approver_parts();
    let edit = PurchaseRequestEdit {
        title: draft.title.trim(),
        required_delivery_date: &draft.required_delivery_date,
        items: draft.cleaned_items(),
        approver_user_id,
        approver_name,
    };
    store.update(
        &purchase_requests_collection(hotel),
        request_id,
        encode(&edit)?,
    )?;
    tracing::info!(hotel_uid = %hotel, %request_id, "purchase request updated");
    Ok(())
}

/// Record an approval decision with an optional note.
pub fn update_purchase_request_status<S: DocumentStore + ?Sized>(
    store: &mut S,
    ctx: &SessionContext,
    request_id: &str,
    status: RequestStatus,
    note: &str,
) -> Result<(), BackofficeError> {
    let user = ctx.require_user()?;
    let hotel = hotel_and_id(ctx, request_id)?;
    let change = StatusChange {
        status,
        status_note: note.trim(),
    };
    store.update(
        &purchase_requests_collection(hotel),
        request_id,
        encode(&change)?,
    )?;
    tracing::info!(hotel_uid = %hotel, %request_id, %status, by = %user.uid, "purchase request status changed");
    Ok(())
}

/// Remove a request from the current hotel.
pub fn delete_purchase_request<S: DocumentStore + ?Sized>(
    store: &mut S,
    ctx: &SessionContext,
    request_id: &str,
) -> Result<(), BackofficeError> {
    let hotel = hotel_and_id(ctx, request_id)?;
    store.delete(&purchase_requests_collection(hotel), request_id)?;
    tracing::info!(hotel_uid = %hotel, %request_id, "purchase request deleted");
    Ok(())
}
