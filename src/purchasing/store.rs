use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::BackofficeError;

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// Collection holding the user records.
pub const USERS_COLLECTION: &str = "users";

/// Collection of the purchase requests of `hotel_uid`.
pub fn purchase_requests_collection(hotel_uid: &str) -> String {
    format!("hotels/{hotel_uid}/purchaseRequests")
}

/// Collection of the purchase request lists of `hotel_uid`.
pub fn purchase_request_lists_collection(hotel_uid: &str) -> String {
    format!("hotels/{hotel_uid}/purchaseRequestLists")
}

/// A document as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    /// Server timestamp assigned on creation.
    pub created_at: DateTime<Utc>,
    pub fields: Fields,
}

impl StoredDocument {
    /// Decode the fields into a record type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, BackofficeError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            BackofficeError::Store(format!("document {} could not be decoded: {e}", self.id))
        })
    }
}

/// Encode a record into a field map.
pub fn encode<T: Serialize>(record: &T) -> Result<Fields, BackofficeError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(BackofficeError::Store(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(BackofficeError::Store(e.to_string())),
    }
}

/// Document database collaborator.
///
/// Collections are addressed by slash-separated paths
/// (e.g. `hotels/h1/purchaseRequests`).
pub trait DocumentStore {
    /// All documents of `collection`, newest first.
    fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, BackofficeError>;

    fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, BackofficeError>;

    /// Add a document with a generated id and the current server time;
    /// returns the id.
    fn create(&mut self, collection: &str, fields: Fields) -> Result<String, BackofficeError>;

    /// Write a document under a known id, replacing any previous one.
    fn put(&mut self, collection: &str, id: &str, fields: Fields) -> Result<(), BackofficeError>;

    /// Merge `fields` into an existing document.
    ///
    /// # Errors
    ///
    /// [`BackofficeError::NotFound`] when the document does not exist.
    fn update(&mut self, collection: &str, id: &str, fields: Fields)
    -> Result<(), BackofficeError>;

    /// Remove a document. Removing a missing document is not an error.
    fn delete(&mut self, collection: &str, id: &str) -> Result<(), BackofficeError>;
}

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    doc: StoredDocument,
}

/// In-memory [`DocumentStore`].
///
/// Documents created within the same clock tick keep their creation
/// order.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    collections: BTreeMap<String, BTreeMap<String, Entry>>,
    next_seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, BTreeMap::len)
    }

    fn insert(&mut self, collection: &str, doc: StoredDocument) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id.clone(), Entry { seq, doc });
    }
}

impl DocumentStore for MemoryStore {
    fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, BackofficeError> {
        let Some(docs) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<&Entry> = docs.values().collect();
        entries.sort_by(|a, b| {
            (b.doc.created_at, b.seq).cmp(&(a.doc.created_at, a.seq))
        });
        Ok(entries.into_iter().map(|e| e.doc.clone()).collect())
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, BackofficeError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|e| e.doc.clone()))
    }

    fn create(&mut self, collection: &str, fields: Fields) -> Result<String, BackofficeError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.insert(
            collection,
            StoredDocument {
                id: id.clone(),
                created_at: Utc::now(),
                fields,
            },
        );
        tracing::debug!(%collection, %id, "document created");
        Ok(id)
    }

    fn put(&mut self, collection: &str, id: &str, fields: Fields) -> Result<(), BackofficeError> {
        self.insert(
            collection,
            StoredDocument {
                id: id.to_string(),
                created_at: Utc::now(),
                fields,
            },
        );
        Ok(())
    }

    fn update(
        &mut self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), BackofficeError> {
        let entry = self
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| BackofficeError::NotFound(format!("{collection}/{id} bestaat niet")))?;
        entry.doc.fields.extend(fields);
        tracing::debug!(%collection, %id, "document updated");
        Ok(())
    }

    fn delete(&mut self, collection: &str, id: &str) -> Result<(), BackofficeError> {
        if let Some(docs) = self.collections.get_mut(collection) {
            docs.remove(id);
        }
        tracing::debug!(%collection, %id, "document deleted");
        Ok(())
    }
}
