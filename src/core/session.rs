use serde::{Deserialize, Serialize};

use super::error::BackofficeError;

/// The signed-in staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl SessionUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Per-request context handed to every service call: who is signed in
/// and which hotel they are working on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user: Option<SessionUser>,
    pub hotel_uid: Option<String>,
}

impl SessionContext {
    /// A context with nobody signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: SessionUser, hotel_uid: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            hotel_uid: Some(hotel_uid.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The signed-in user, or [`BackofficeError::Unauthenticated`].
    pub fn require_user(&self) -> Result<&SessionUser, BackofficeError> {
        self.user.as_ref().ok_or(BackofficeError::Unauthenticated)
    }

    /// The selected hotel, if any. Blank identifiers count as unset.
    pub fn hotel_uid(&self) -> Option<&str> {
        self.hotel_uid
            .as_deref()
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
    }

    /// The selected hotel, or a validation error carrying `message`.
    pub fn require_hotel(&self, message: &str) -> Result<&str, BackofficeError> {
        self.hotel_uid()
            .ok_or_else(|| BackofficeError::Validation(message.to_string()))
    }
}

/// Authentication collaborator.
pub trait AuthProvider {
    /// The user of the live session, if any.
    fn current_user(&self) -> Option<SessionUser>;

    /// End the live session.
    fn sign_out(&mut self) -> Result<(), BackofficeError>;
}

/// Sign out through `auth`, clear the session context and return the
/// route the caller should navigate to.
pub fn sign_out<A: AuthProvider + ?Sized>(
    auth: &mut A,
    ctx: &mut SessionContext,
) -> Result<Route, BackofficeError> {
    auth.sign_out()?;
    let uid = ctx.user.as_ref().map(|u| u.uid.clone()).unwrap_or_default();
    *ctx = SessionContext::anonymous();
    tracing::info!(%uid, "signed out");
    Ok(Route::Login)
}

/// Dashboard routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Dashboard,
    GeneralSettings,
    UserConfiguration,
    UserConfigurationEdit(String),
    PurchaseRequests,
    PurchaseRequestNew,
    PurchaseRequestPreview(String),
    PurchaseRequestEdit(String),
    PurchaseRequestLists,
    PurchaseRequestListNew,
    PurchaseRequestListPreview(String),
    PurchaseRequestListEdit(String),
    PeppolReader,
    /// Any path not listed above.
    Unknown(String),
}

impl Route {
    /// Resolve a URL path. Trailing slashes and query strings are ignored.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Landing,
            ["login"] => Route::Login,
            ["dashboard"] => Route::Dashboard,
            ["settings", "general"] => Route::GeneralSettings,
            ["settings", "user-configuration"] => Route::UserConfiguration,
            ["settings", "user-configuration", id] => Route::UserConfigurationEdit(id.to_string()),
            ["purchase-requests"] => Route::PurchaseRequests,
            ["purchase-requests", "new"] => Route::PurchaseRequestNew,
            ["purchase-requests", id] => Route::PurchaseRequestPreview(id.to_string()),
            ["purchase-requests", id, "edit"] => Route::PurchaseRequestEdit(id.to_string()),
            ["purchase-request-lists"] => Route::PurchaseRequestLists,
            ["purchase-request-lists", "new"] => Route::PurchaseRequestListNew,
            ["purchase-request-lists", id] => Route::PurchaseRequestListPreview(id.to_string()),
            ["purchase-request-lists", id, "edit"] => {
                Route::PurchaseRequestListEdit(id.to_string())
            }
            ["peppol-reader"] => Route::PeppolReader,
            _ => Route::Unknown(path.to_string()),
        }
    }

    /// Canonical path of the route.
    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".into(),
            Route::Login => "/login".into(),
            Route::Dashboard => "/dashboard".into(),
            Route::GeneralSettings => "/settings/general".into(),
            Route::UserConfiguration => "/settings/user-configuration".into(),
            Route::UserConfigurationEdit(id) => format!("/settings/user-configuration/{id}"),
            Route::PurchaseRequests => "/purchase-requests".into(),
            Route::PurchaseRequestNew => "/purchase-requests/new".into(),
            Route::PurchaseRequestPreview(id) => format!("/purchase-requests/{id}"),
            Route::PurchaseRequestEdit(id) => format!("/purchase-requests/{id}/edit"),
            Route::PurchaseRequestLists => "/purchase-request-lists".into(),
            Route::PurchaseRequestListNew => "/purchase-request-lists/new".into(),
            Route::PurchaseRequestListPreview(id) => format!("/purchase-request-lists/{id}"),
            Route::PurchaseRequestListEdit(id) => format!("/purchase-request-lists/{id}/edit"),
            Route::PeppolReader => "/peppol-reader".into(),
            Route::Unknown(path) => path.clone(),
        }
    }

    /// Whether the route is reachable without signing in.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Landing | Route::Login)
    }
}

/// Outcome of [`guard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(Route),
}

/// Decide whether `route` may be rendered for `ctx`.
///
/// Unknown paths always redirect to the login page, protected pages do
/// so when nobody is signed in.
pub fn guard(ctx: &SessionContext, route: &Route) -> RouteDecision {
    match route {
        Route::Unknown(_) => RouteDecision::Redirect(Route::Login),
        r if r.is_public() => RouteDecision::Allow,
        _ if ctx.is_authenticated() => RouteDecision::Allow,
        r => {
            tracing::debug!(path = %r.path(), "redirecting unauthenticated request");
            RouteDecision::Redirect(Route::Login)
        }
    }
}
