use backoffice::purchasing::*;
use backoffice::{BackofficeError, RoleCatalog, SessionContext, SessionUser};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), BackofficeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut store = MemoryStore::new();
    let ctx = SessionContext::signed_in(SessionUser::new("u-inkoop"), "hotel-aan-zee");

    // ── Users ──────────────────────────────────────────────────────────
    for (id, user) in [
        ("u-inkoop", json!({"displayName": "Inkoop", "roles": {"hotel-aan-zee": ["Purchaser"]}})),
        ("u-manager", json!({"displayName": "Sanne", "roles": {"hotel-aan-zee": ["Manager"]}})),
        ("u-admin", json!({"email": "admin@hotel.test", "roles": ["Admin"]})),
    ] {
        let serde_json::Value::Object(fields) = user else {
            continue;
        };
        store.put(USERS_COLLECTION, id, fields)?;
    }
    let users = list_users(&store)?;
    let catalog = RoleCatalog::default();
    let choices: Vec<Approver> = approvers(&users, "hotel-aan-zee", &catalog)
        .into_iter()
        .map(UserRecord::as_approver)
        .collect();
    println!("=== Goedkeurders ===");
    for approver in &choices {
        println!("  {} ({})", approver.name, approver.user_id);
    }

    // ── Purchase request list ──────────────────────────────────────────
    let mut list = PurchaseRequestListDraft::new("Ontbijtbuffet");
    list.items = vec![
        PurchaseItemInput {
            article_number: "K-100".into(),
            name: "Koffiebonen".into(),
            supplier: "Brander & Co".into(),
            unit: "kg".into(),
            quantity: "5".into(),
            net_price: "18.50".into(),
            vat_percent: "9".into(),
        },
        PurchaseItemInput {
            name: "Jus d'orange".into(),
            unit: "l".into(),
            quantity: "20".into(),
            net_price: "2.10".into(),
            vat_percent: "9".into(),
            ..Default::default()
        },
    ];
    let list_id = create_purchase_request_list(&mut store, &ctx, &list)?;
    let list = get_purchase_request_list(&store, &ctx, &list_id)?
        .ok_or_else(|| BackofficeError::NotFound(list_id.clone()))?;

    println!("\n=== Catalogus ===");
    for item in catalog_items(std::slice::from_ref(&list)) {
        println!("  {}", item.label());
    }

    // ── Purchase request from the list ─────────────────────────────────
    let mut draft = PurchaseRequestDraft::from_list(&list);
    draft.required_delivery_date = "2024-06-03".into();
    if let Some(approver) = choices.first() {
        draft.approver = Some(approver.clone());
    }
    let request_id = create_purchase_request(&mut store, &ctx, &draft)?;
    update_purchase_request_status(
        &mut store,
        &ctx,
        &request_id,
        RequestStatus::Approved,
        "Akkoord, levering maandag",
    )?;

    println!("\n=== Aanvragen ===");
    for request in list_purchase_requests(&store, &ctx)? {
        println!(
            "  {} [{}] netto {} bruto {} ({})",
            request.title,
            request.status,
            request.net_total(),
            request.gross_total(),
            request.status_note
        );
    }
    Ok(())
}
