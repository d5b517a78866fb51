use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::items::{PurchaseItem, PurchaseItemInput};
use super::store::{
    DocumentStore, Fields, StoredDocument, encode, purchase_request_lists_collection,
};
use crate::core::{BackofficeError, SessionContext, ValidationError, into_result};

const HOTEL_REQUIRED: &str = "Hotel uid is verplicht";
const HOTEL_AND_ID_REQUIRED: &str = "Hotel uid en listId zijn verplicht";
const LIST_MISSING: &str = "Purchase Request List bestaat niet";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PurchaseRequestListRecord {
    title: String,
    items: Vec<PurchaseItem>,
}

/// A reusable catalogue of purchase items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseRequestList {
    pub id: String,
    pub title: String,
    pub items: Vec<PurchaseItem>,
    pub created_at: DateTime<Utc>,
}

impl PurchaseRequestList {
    fn from_document(doc: &StoredDocument) -> Result<Self, BackofficeError> {
        let record: PurchaseRequestListRecord = doc.decode()?;
        Ok(Self {
            id: doc.id.clone(),
            title: record.title,
            items: record.items,
            created_at: doc.created_at,
        })
    }
}

/// Form state for creating or editing a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequestListDraft {
    pub title: String,
    pub items: Vec<PurchaseItemInput>,
}

impl Default for PurchaseRequestListDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            items: vec![PurchaseItemInput::default()],
        }
    }
}

impl PurchaseRequestListDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn from_list(list: &PurchaseRequestList) -> Self {
        Self {
            title: list.title.clone(),
            items: list.items.iter().map(PurchaseItemInput::from).collect(),
        }
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        if self.title.trim().is_empty() {
            vec![ValidationError::new("title", "is verplicht")]
        } else {
            Vec::new()
        }
    }

    fn record(&self) -> PurchaseRequestListRecord {
        PurchaseRequestListRecord {
            title: self.title.trim().to_string(),
            items: self.items.iter().map(PurchaseItemInput::clean).collect(),
        }
    }
}

fn hotel_and_id<'a>(ctx: &'a SessionContext, list_id: &str) -> Result<&'a str, BackofficeError> {
    let hotel = ctx.require_hotel(HOTEL_AND_ID_REQUIRED)?;
    if list_id.trim().is_empty() {
        return Err(BackofficeError::Validation(HOTEL_AND_ID_REQUIRED.into()));
    }
    Ok(hotel)
}

/// All lists of the current hotel, newest first. Empty when no hotel is
/// selected.
pub fn list_purchase_request_lists<S: DocumentStore + ?Sized>(
    store: &S,
    ctx: &SessionContext,
) -> Result<Vec<PurchaseRequestList>, BackofficeError> {
    let Some(hotel) = ctx.hotel_uid() else {
        return Ok(Vec::new());
    };
    store
        .list(&purchase_request_lists_collection(hotel))?
        .iter()
        .map(PurchaseRequestList::from_document)
        .collect()
}

/// One list of the current hotel; `None` without a hotel or id, or when
/// the list does not exist.
pub fn get_purchase_request_list<S: DocumentStore + ?Sized>(
    store: &S,
    ctx: &SessionContext,
    list_id: &str,
) -> Result<Option<PurchaseRequestList>, BackofficeError> {
    let Some(hotel) = ctx.hotel_uid() else {
        return Ok(None);
    };
    if list_id.is_empty() {
        return Ok(None);
    }
    store
        .get(&purchase_request_lists_collection(hotel), list_id)?
        .as_ref()
        .map(PurchaseRequestList::from_document)
        .transpose()
}

/// Store a new list with cleaned items and return its id.
pub fn create_purchase_request_list<S: DocumentStore + ?Sized>(
    store: &mut S,
    ctx: &SessionContext,
    draft: &PurchaseRequestListDraft,
) -> Result<String, BackofficeError> {
    let hotel = ctx.require_hotel(HOTEL_REQUIRED)?;
    into_result(draft.validate())?;
    let record = draft.record();
    let id = store.create(&purchase_request_lists_collection(hotel), encode(&record)?)?;
    tracing::info!(hotel_uid = %hotel, list_id = %id, items = record.items.len(), "purchase request list created");
    Ok(id)
}

/// Replace the title and items of an existing list.
pub fn update_purchase_request_list<S: DocumentStore + ?Sized>(
    store: &mut S,
    ctx: &SessionContext,
    list_id: &str,
    draft: &PurchaseRequestListDraft,
) -> Result<(), BackofficeError> {
    let hotel = hotel_and_id(ctx, list_id)?;
    into_result(draft.validate())?;
    store.update(
        &purchase_request_lists_collection(hotel),
        list_id,
        encode(&draft.record())?,
    )?;
    tracing::info!(hotel_uid = %hotel, %list_id, "purchase request list updated");
    Ok(())
}

/// Remove a list from the current hotel.
pub fn delete_purchase_request_list<S: DocumentStore + ?Sized>(
    store: &mut S,
    ctx: &SessionContext,
    list_id: &str,
) -> Result<(), BackofficeError> {
    let hotel = hotel_and_id(ctx, list_id)?;
    store.delete(&purchase_request_lists_collection(hotel), list_id)?;
    tracing::info!(hotel_uid = %hotel, %list_id, "purchase request list deleted");
    Ok(())
}

/// Append one cleaned item to an existing list.
pub fn add_item_to_purchase_request_list<S: DocumentStore + ?Sized>(
    store: &mut S,
    ctx: &SessionContext,
    list_id: &str,
    item: &PurchaseItemInput,
) -> Result<(), BackofficeError> {
    add_items_to_purchase_request_list(store, ctx, list_id, std::slice::from_ref(item))
}

/// Append cleaned items to an existing list, in order.
pub fn add_items_to_purchase_request_list<S: DocumentStore + ?Sized>(
    store: &mut S,
    ctx: &SessionContext,
    list_id: &str,
    items: &[PurchaseItemInput],
) -> Result<(), BackofficeError> {
    let hotel = hotel_and_id(ctx, list_id)?;
    let collection = purchase_request_lists_collection(hotel);
    let doc = store
        .get(&collection, list_id)?
        .ok_or_else(|| BackofficeError::NotFound(LIST_MISSING.into()))?;

    let mut record: PurchaseRequestListRecord = doc.decode()?;
    record.items.extend(items.iter().map(PurchaseItemInput::clean));

    let mut fields = Fields::new();
    fields.insert(
        "items".into(),
        serde_json::to_value(&record.items).map_err(|e| BackofficeError::Store(e.to_string()))?,
    );
    store.update(&collection, list_id, fields)?;
    tracing::info!(hotel_uid = %hotel, %list_id, added = items.len(), "items added to purchase request list");
    Ok(())
}

/// Every distinct item across `lists`, in first-seen order.
pub fn catalog_items(lists: &[PurchaseRequestList]) -> Vec<PurchaseItem> {
    let mut seen = HashSet::new();
    lists
        .iter()
        .flat_map(|list| list.items.iter())
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

/// The catalogue item whose [`label`](PurchaseItem::label) is `label`.
pub fn find_catalog_item<'a>(catalog: &'a [PurchaseItem], label: &str) -> Option<&'a PurchaseItem> {
    catalog.iter().find(|item| item.label() == label)
}
