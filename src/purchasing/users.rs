use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::requests::Approver;
use super::store::{DocumentStore, Fields, StoredDocument, USERS_COLLECTION};
use crate::core::{BackofficeError, Permission, RoleCatalog, SessionContext};

const HOTEL_AND_ID_REQUIRED: &str = "Hotel uid en userId zijn verplicht";
const USER_MISSING: &str = "Gebruiker bestaat niet";

/// Role assignment of a user.
///
/// Older records carry one flat list that applies to every hotel; newer
/// ones keep a list per hotel uid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRoles {
    Global(Vec<String>),
    PerHotel(BTreeMap<String, Vec<String>>),
}

impl Default for UserRoles {
    fn default() -> Self {
        UserRoles::PerHotel(BTreeMap::new())
    }
}

impl UserRoles {
    /// Roles that apply in `hotel_uid`.
    pub fn for_hotel(&self, hotel_uid: &str) -> &[String] {
        match self {
            UserRoles::Global(roles) => roles,
            UserRoles::PerHotel(map) => map.get(hotel_uid).map_or(&[][..], Vec::as_slice),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UserDocument {
    display_name: String,
    email: String,
    roles: UserRoles,
}

/// A back-office user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub roles: UserRoles,
}

impl UserRecord {
    fn from_document(doc: &StoredDocument) -> Result<Self, BackofficeError> {
        let record: UserDocument = doc.decode()?;
        Ok(Self {
            id: doc.id.clone(),
            display_name: record.display_name,
            email: record.email,
            roles: record.roles,
        })
    }

    /// Display name, or the e-mail address when no name is set.
    pub fn name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.email
        } else {
            &self.display_name
        }
    }

    /// The user as an approver choice on a purchase request.
    pub fn as_approver(&self) -> Approver {
        Approver {
            user_id: self.id.clone(),
            name: self.name().to_string(),
        }
    }
}

/// Roles of `user` in `hotel_uid`: a legacy flat list as-is, otherwise the
/// hotel's entry, otherwise nothing.
pub fn roles_for_hotel<'a>(user: &'a UserRecord, hotel_uid: &str) -> &'a [String] {
    user.roles.for_hotel(hotel_uid)
}

/// Whether `user` holds `permission` in `hotel_uid`.
pub fn has_permission(
    user: &UserRecord,
    hotel_uid: &str,
    catalog: &RoleCatalog,
    permission: Permission,
) -> bool {
    catalog.grants(roles_for_hotel(user, hotel_uid), permission)
}

/// Users that may approve purchase requests in `hotel_uid`, in input order.
pub fn approvers<'a>(
    users: &'a [UserRecord],
    hotel_uid: &str,
    catalog: &RoleCatalog,
) -> Vec<&'a UserRecord> {
    users
        .iter()
        .filter(|user| has_permission(user, hotel_uid, catalog, Permission::ApprovePurchaseRequests))
        .collect()
}

/// Every user record, newest first.
pub fn list_users<S: DocumentStore + ?Sized>(store: &S) -> Result<Vec<UserRecord>, BackofficeError> {
    store
        .list(USERS_COLLECTION)?
        .iter()
        .map(UserRecord::from_document)
        .collect()
}

/// One user by id; `None` for an empty id or a missing record.
pub fn get_user<S: DocumentStore + ?Sized>(
    store: &S,
    user_id: &str,
) -> Result<Option<UserRecord>, BackofficeError> {
    if user_id.is_empty() {
        return Ok(None);
    }
    store
        .get(USERS_COLLECTION, user_id)?
        .as_ref()
        .map(UserRecord::from_document)
        .transpose()
}

/// Replace the roles of `user_id` in the current hotel.
///
/// Duplicate role names are dropped, keeping the first occurrence. A user
/// still on a flat role list is moved to per-hotel roles holding only the
/// current hotel's entry.
pub fn update_user_roles<S: DocumentStore + ?Sized>(
    store: &mut S,
    ctx: &SessionContext,
    user_id: &str,
    roles: &[String],
) -> Result<(), BackofficeError> {
    let hotel = ctx.require_hotel(HOTEL_AND_ID_REQUIRED)?;
    if user_id.trim().is_empty() {
        return Err(BackofficeError::Validation(HOTEL_AND_ID_REQUIRED.into()));
    }
    let user = get_user(store, user_id)?
        .ok_or_else(|| BackofficeError::NotFound(USER_MISSING.into()))?;

    let mut unique: Vec<String> = Vec::with_capacity(roles.len());
    for role in roles.iter().map(|r| r.trim()).filter(|r| !r.is_empty()) {
        if !unique.iter().any(|r| r == role) {
            unique.push(role.to_string());
        }
    }

    let mut per_hotel = match user.roles {
        UserRoles::PerHotel(map) => map,
        UserRoles::Global(legacy) => {
            tracing::debug!(%user_id, legacy = ?legacy, "converting flat role list to per-hotel roles");
            BTreeMap::new()
        }
    };
    per_hotel.insert(hotel.to_string(), unique);

    let mut fields = Fields::new();
    fields.insert(
        "roles".into(),
        serde_json::to_value(UserRoles::PerHotel(per_hotel))
            .map_err(|e| BackofficeError::Store(e.to_string()))?,
    );
    store.update(USERS_COLLECTION, user_id, fields)?;
    tracing::info!(hotel_uid = %hotel, %user_id, "user roles updated");
    Ok(())
}

/// Remove a user record. Deleting a missing user is not an error.
pub fn delete_user<S: DocumentStore + ?Sized>(
    store: &mut S,
    user_id: &str,
) -> Result<(), BackofficeError> {
    if user_id.trim().is_empty() {
        return Err(BackofficeError::Validation("userId is verplicht".into()));
    }
    store.delete(USERS_COLLECTION, user_id)?;
    tracing::info!(%user_id, "user deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, roles: UserRoles) -> UserRecord {
        UserRecord {
            id: id.into(),
            display_name: String::new(),
            email: format!("{id}@hotel.test"),
            roles,
        }
    }

    #[test]
    fn roles_deserialize_from_both_shapes() {
        let flat: UserRoles = serde_json::from_str(r#"["Admin"]"#).unwrap();
        assert_eq!(flat, UserRoles::Global(vec!["Admin".into()]));
        let map: UserRoles = serde_json::from_str(r#"{"h1": ["Manager"]}"#).unwrap();
        assert_eq!(map.for_hotel("h1"), ["Manager".to_string()]);
        assert!(map.for_hotel("h2").is_empty());
        assert_eq!(flat.for_hotel("anything"), ["Admin".to_string()]);
    }

    #[test]
    fn approvers_filter_on_permission_in_hotel() {
        let mut map = BTreeMap::new();
        map.insert("h1".to_string(), vec!["Manager".to_string()]);
        map.insert("h2".to_string(), vec!["Purchaser".to_string()]);
        let users = vec![
            user("a", UserRoles::PerHotel(map)),
            user("b", UserRoles::Global(vec!["Accounting".into()])),
            user("c", UserRoles::Global(vec!["Admin".into()])),
        ];
        let catalog = RoleCatalog::default();

        let h1: Vec<&str> = approvers(&users, "h1", &catalog).into_iter().map(|u| u.id.as_str()).collect();
        assert_eq!(h1, vec!["a", "c"]);
        let h2: Vec<&str> = approvers(&users, "h2", &catalog).into_iter().map(|u| u.id.as_str()).collect();
        assert_eq!(h2, vec!["c"]);
    }

    #[test]
    fn name_falls_back_to_email() {
        let mut u = user("x", UserRoles::default());
        assert_eq!(u.name(), "x@hotel.test");
        u.display_name = "Sanne".into();
        assert_eq!(u.as_approver().name, "Sanne");
    }
}
