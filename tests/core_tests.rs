use backoffice::core::*;

struct StaticAuth {
    user: Option<SessionUser>,
    fail: bool,
}

impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<SessionUser> {
        self.user.clone()
    }

    fn sign_out(&mut self) -> Result<(), BackofficeError> {
        if self.fail {
            return Err(BackofficeError::Unauthenticated);
        }
        self.user = None;
        Ok(())
    }
}

fn signed_in() -> SessionContext {
    SessionContext::signed_in(
        SessionUser::new("u-1")
            .with_email("receptie@hotel.test")
            .with_display_name("Receptie"),
        "hotel-1",
    )
}

// --- Routing ---

#[test]
fn every_known_path_round_trips() {
    for path in [
        "/",
        "/login",
        "/dashboard",
        "/settings/general",
        "/settings/user-configuration",
        "/settings/user-configuration/u-7",
        "/purchase-requests",
        "/purchase-requests/new",
        "/purchase-requests/r-1",
        "/purchase-requests/r-1/edit",
        "/purchase-request-lists",
        "/purchase-request-lists/new",
        "/purchase-request-lists/l-1",
        "/purchase-request-lists/l-1/edit",
        "/peppol-reader",
    ] {
        let route = Route::parse(path);
        assert!(!matches!(route, Route::Unknown(_)), "{path}");
        assert_eq!(route.path(), path);
    }
}

#[test]
fn query_and_trailing_slash_are_ignored() {
    assert_eq!(Route::parse("/peppol-reader/?x=1"), Route::PeppolReader);
    assert_eq!(
        Route::parse("/purchase-requests/abc/edit#top"),
        Route::PurchaseRequestEdit("abc".into())
    );
}

#[test]
fn anonymous_users_only_reach_public_pages() {
    let anon = SessionContext::anonymous();
    assert_eq!(guard(&anon, &Route::Login), RouteDecision::Allow);
    assert_eq!(guard(&anon, &Route::Landing), RouteDecision::Allow);
    for path in ["/dashboard", "/peppol-reader", "/purchase-requests/new"] {
        assert_eq!(
            guard(&anon, &Route::parse(path)),
            RouteDecision::Redirect(Route::Login),
            "{path}"
        );
    }
}

#[test]
fn signed_in_users_reach_everything_known() {
    let ctx = signed_in();
    assert_eq!(guard(&ctx, &Route::PeppolReader), RouteDecision::Allow);
    assert_eq!(
        guard(&ctx, &Route::parse("/settings/user-configuration/u-2")),
        RouteDecision::Allow
    );
    assert_eq!(
        guard(&ctx, &Route::parse("/does/not/exist")),
        RouteDecision::Redirect(Route::Login)
    );
}

// --- Session ---

#[test]
fn sign_out_clears_context() {
    let mut auth = StaticAuth {
        user: Some(SessionUser::new("u-1")),
        fail: false,
    };
    let mut ctx = signed_in();
    let next = sign_out(&mut auth, &mut ctx).unwrap();
    assert_eq!(next, Route::Login);
    assert_eq!(ctx, SessionContext::anonymous());
    assert!(auth.current_user().is_none());
    assert_eq!(guard(&ctx, &Route::Dashboard), RouteDecision::Redirect(Route::Login));
}

#[test]
fn failed_sign_out_keeps_context() {
    let mut auth = StaticAuth {
        user: Some(SessionUser::new("u-1")),
        fail: true,
    };
    let mut ctx = signed_in();
    assert!(sign_out(&mut auth, &mut ctx).is_err());
    assert!(ctx.is_authenticated());
    assert_eq!(ctx.hotel_uid(), Some("hotel-1"));
}

#[test]
fn blank_hotel_counts_as_missing() {
    let mut ctx = signed_in();
    ctx.hotel_uid = Some("  ".into());
    assert_eq!(ctx.hotel_uid(), None);
    let err = ctx.require_hotel("Hotel uid is verplicht").unwrap_err();
    assert_eq!(err.to_string(), "Hotel uid is verplicht");
}

// --- Configuration ---

#[test]
fn config_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("backoffice-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("backoffice.json");
    std::fs::write(
        &path,
        r#"{
            "report": {"head_fill": [0, 80, 160], "body_font_size": 9},
            "roles": {"Nachtportier": ["read_peppol_invoices"]}
        }"#,
    )
    .unwrap();

    let config = BackofficeConfig::load(&path).unwrap();
    assert_eq!(config.report.head_fill, [0, 80, 160]);
    assert_eq!(config.report.body_font_size, 9.0);
    assert_eq!(config.report.title, "Peppol UBL factuur");
    assert_eq!(config.roles.role_names().collect::<Vec<_>>(), vec!["Nachtportier"]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_config_file_is_config_error() {
    let err = BackofficeConfig::load("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, BackofficeError::Config(_)));
}

#[test]
fn unknown_permission_is_rejected() {
    let err = BackofficeConfig::from_json_str(r#"{"roles": {"X": ["fly"]}}"#).unwrap_err();
    assert!(matches!(err, BackofficeError::Config(_)));
}

#[test]
fn default_catalog_has_an_approver_role() {
    let catalog = RoleCatalog::default();
    let approving: Vec<&str> = catalog
        .role_names()
        .filter(|role| catalog.grants(&[*role], Permission::ApprovePurchaseRequests))
        .collect();
    assert_eq!(approving, vec!["Admin", "Manager"]);
}
