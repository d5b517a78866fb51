//! Purchase requests, purchase request lists and user roles.
//!
//! Everything is stored through a [`DocumentStore`]; [`MemoryStore`] is
//! the in-process implementation. Hotel-scoped operations take the hotel
//! from the [`SessionContext`](crate::core::SessionContext).
//!
//! # Example
//!
//! ```
//! use backoffice::{SessionContext, SessionUser};
//! use backoffice::purchasing::{self, MemoryStore, PurchaseRequestDraft, RequestStatus};
//!
//! let mut store = MemoryStore::new();
//! let ctx = SessionContext::signed_in(SessionUser::new("u1"), "hotel-1");
//!
//! let draft = PurchaseRequestDraft::new("Linnen", "2024-06-01");
//! let id = purchasing::create_purchase_request(&mut store, &ctx, &draft).unwrap();
//! purchasing::update_purchase_request_status(&mut store, &ctx, &id, RequestStatus::Approved, "ok").unwrap();
//!
//! let request = purchasing::get_purchase_request(&store, &ctx, &id).unwrap().unwrap();
//! assert_eq!(request.status, RequestStatus::Approved);
//! ```

mod items;
mod lists;
mod requests;
mod store;
mod users;

pub use items::{PurchaseItem, PurchaseItemInput};
pub use lists::{
    PurchaseRequestList, PurchaseRequestListDraft, add_item_to_purchase_request_list,
    add_items_to_purchase_request_list, catalog_items, create_purchase_request_list,
    delete_purchase_request_list, find_catalog_item, get_purchase_request_list,
    list_purchase_request_lists, update_purchase_request_list,
};
pub use requests::{
    Approver, PurchaseRequest, PurchaseRequestDraft, RequestStatus, create_purchase_request,
    delete_purchase_request, get_purchase_request, list_purchase_requests,
    update_purchase_request, update_purchase_request_status,
};
pub use store::{
    DocumentStore, Fields, MemoryStore, StoredDocument, USERS_COLLECTION, encode,
    purchase_request_lists_collection, purchase_requests_collection,
};
pub use users::{
    UserRecord, UserRoles, approvers, delete_user, get_user, has_permission, list_users,
    roles_for_hotel, update_user_roles,
};
