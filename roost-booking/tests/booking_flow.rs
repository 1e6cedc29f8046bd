use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use roost_booking::{
    BookingError, BookingOrchestrator, BookingStatus, BookingStore, CreateBookingRequest,
    InMemoryBookingStore, InMemoryListingStore,
};
use roost_catalog::{
    ChargeItem, CreateListingRequest, Listing, ListingManager, ListingPatch, ListingStatus,
};
use roost_core::{Actor, Clock, FixedClock, Query, Role};

struct Harness {
    bookings: Arc<InMemoryBookingStore>,
    manager: ListingManager,
    orchestrator: BookingOrchestrator,
    clock: Arc<dyn Clock>,
}

/// Fixed to a Monday so weekend-only discounts stay out of the way.
fn monday_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2025, 6, 9, 12, 0, 0).unwrap(),
    ))
}

fn harness() -> Harness {
    let bookings = Arc::new(InMemoryBookingStore::new());
    let listings = Arc::new(InMemoryListingStore::new());
    let clock: Arc<FixedClock> = monday_clock();

    Harness {
        manager: ListingManager::new(listings.clone(), clock.clone()),
        orchestrator: BookingOrchestrator::new(bookings.clone(), listings, clock.clone()),
        bookings,
        clock,
    }
}

fn host() -> Actor {
    Actor::new("host-1", "fed-host-1", Some("org1".into()), vec![Role::Admin])
}

fn client() -> Actor {
    Actor::new("guest-1", "fed-guest-1", Some("org2".into()), vec![Role::Client])
}

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

/// Listing at base rate 100 with a 10% daily statutory premium, a fixed
/// loading of 5 and a 20% discount from 3 nights.
async fn seed_listing(h: &Harness) -> Listing {
    let mut statutory = ChargeItem::percentage("vat", dec(10));
    statutory.is_paid_daily = true;
    let mut discount = ChargeItem::percentage("long-stay", dec(20));
    discount.days = Some(3);

    h.manager
        .create_listing(
            &host(),
            CreateListingRequest {
                name: "Lakeside cabin".into(),
                description: "Two bedrooms by the lake".into(),
                listing_type: "cabin".into(),
                longitude: 36.82,
                latitude: -1.29,
                amount: dec(100),
                statutory_premiums: vec![statutory],
                loadings: vec![ChargeItem::fixed("service", dec(5))],
                discounts: vec![discount],
                amenities: vec![],
            },
        )
        .await
        .unwrap()
}

fn request(listing_id: Uuid, start: NaiveDate, end: NaiveDate) -> CreateBookingRequest {
    CreateBookingRequest {
        listing_id,
        start_date: start,
        end_date: end,
        amenities: vec![],
        extra: serde_json::Map::new(),
    }
}

#[tokio::test]
async fn booking_happy_path_prices_the_stay() {
    let h = harness();
    let listing = seed_listing(&h).await;
    let today = h.clock.today();

    let mut req = request(listing.id, today, today + Duration::days(3));
    req.extra
        .insert("specialRequests".into(), json!("late checkout"));
    req.extra.insert("organisationId".into(), json!("org-evil"));

    let booking = h.orchestrator.make_booking(&client(), req).await.unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.number_of_days, 4);
    assert_eq!(booking.feduid, "fed-guest-1");
    assert_eq!(booking.client_id, "guest-1");
    // the booking lives in the tenant that owns the unit
    assert_eq!(booking.organisation_id.as_deref(), Some("org1"));
    // caller-supplied protected keys are discarded, the rest carried
    assert_eq!(
        booking.extra.get("specialRequests"),
        Some(&json!("late checkout"))
    );
    assert!(booking.extra.get("organisationId").is_none());

    // 100*4 + 40 + 5 - 20
    assert_eq!(booking.receipt.basic_premium, dec(400));
    assert_eq!(booking.receipt.total_statutory_premiums, dec(40));
    assert_eq!(booking.receipt.total_loading_amounts, dec(5));
    assert_eq!(booking.receipt.total_discounts_amounts, dec(20));
    assert_eq!(booking.receipt.amount, dec(425));
}

#[tokio::test]
async fn amenities_are_itemized_but_not_charged() {
    let h = harness();
    let listing = seed_listing(&h).await;
    let today = h.clock.today();

    let mut req = request(listing.id, today, today + Duration::days(3));
    req.amenities = vec![ChargeItem::fixed("wifi", dec(15))];

    let booking = h.orchestrator.make_booking(&client(), req).await.unwrap();

    assert_eq!(booking.receipt.total_amenities_amounts, dec(15));
    assert_eq!(booking.receipt.applied_amenities.len(), 1);
    assert_eq!(booking.receipt.amount, dec(425));
}

#[tokio::test]
async fn past_dates_are_rejected() {
    let h = harness();
    let listing = seed_listing(&h).await;
    let today = h.clock.today();

    let err = h
        .orchestrator
        .make_booking(
            &client(),
            request(listing.id, today - Duration::days(1), today + Duration::days(2)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidDateRange));

    let err = h
        .orchestrator
        .make_booking(
            &client(),
            request(listing.id, today + Duration::days(5), today + Duration::days(2)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidDateRange));
}

#[tokio::test]
async fn occupied_unit_is_a_conflict() {
    let h = harness();
    let listing = seed_listing(&h).await;
    let today = h.clock.today();

    let first = h
        .orchestrator
        .make_booking(&client(), request(listing.id, today, today))
        .await
        .unwrap();

    let err = h
        .orchestrator
        .make_booking(&client(), request(listing.id, today, today + Duration::days(2)))
        .await
        .unwrap_err();
    match err {
        BookingError::Conflict {
            conflicting_booking,
        } => assert_eq!(conflicting_booking, Some(first.id)),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_or_inactive_unit_is_not_found() {
    let h = harness();
    let today = h.clock.today();

    let err = h
        .orchestrator
        .make_booking(
            &client(),
            request(Uuid::new_v4(), today, today + Duration::days(1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound));

    // deactivated listing behaves the same
    let listing = seed_listing(&h).await;
    h.manager
        .update_listing(
            &host(),
            listing.id,
            ListingPatch {
                status: Some(ListingStatus::Inactive),
                ..ListingPatch::default()
            },
        )
        .await
        .unwrap();

    let err = h
        .orchestrator
        .make_booking(
            &client(),
            request(listing.id, today, today + Duration::days(1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound));
}

#[tokio::test]
async fn invalid_amenity_batch_rejected_before_any_write() {
    let h = harness();
    let listing = seed_listing(&h).await;
    let today = h.clock.today();

    let mut req = request(listing.id, today, today + Duration::days(2));
    req.amenities = vec![ChargeItem::percentage("", dec(10))];

    let err = h.orchestrator.make_booking(&client(), req).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidInput(_)));

    let all = h.bookings.find(&Query::new()).await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn storage_failure_is_surfaced_as_transient() {
    let h = harness();
    let listing = seed_listing(&h).await;
    let today = h.clock.today();
    h.bookings.set_unavailable(true);

    let err = h
        .orchestrator
        .make_booking(
            &client(),
            request(listing.id, today, today + Duration::days(1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Transient(_)));
}

#[tokio::test]
async fn list_bookings_is_tenant_and_self_scoped() {
    let h = harness();
    let listing = seed_listing(&h).await;
    let today = h.clock.today();

    let guest = client();
    h.orchestrator
        .make_booking(&guest, request(listing.id, today + Duration::days(1), today + Duration::days(2)))
        .await
        .unwrap();

    // the owning tenant's admin sees the booking
    let seen = h.orchestrator.list_bookings(&host(), Query::new()).await.unwrap();
    assert_eq!(seen.len(), 1);

    // an admin of an unrelated tenant sees nothing, even when asking for org1
    let outsider = Actor::new("a2", "fed-a2", Some("org9".into()), vec![Role::Admin]);
    let mut widened = Query::new();
    widened.organisation_id = Some("org1".into());
    assert!(h
        .orchestrator
        .list_bookings(&outsider, widened)
        .await
        .unwrap()
        .is_empty());

    // a different client in the owning tenant is self-scoped away from it
    let other_guest = Actor::new("guest-2", "fed-guest-2", Some("org1".into()), vec![Role::Client]);
    assert!(h
        .orchestrator
        .list_bookings(&other_guest, Query::new())
        .await
        .unwrap()
        .is_empty());

    // a superadmin sees across tenants
    let root = Actor::new("root", "fed-root", None, vec![Role::Superadmin]);
    assert_eq!(
        h.orchestrator.list_bookings(&root, Query::new()).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn search_matches_custom_fields_inside_scope() {
    let h = harness();
    let listing = seed_listing(&h).await;
    let today = h.clock.today();

    let mut req = request(listing.id, today + Duration::days(1), today + Duration::days(2));
    req.extra.insert("channel".into(), json!("mobile"));
    h.orchestrator.make_booking(&client(), req).await.unwrap();

    let hits = h
        .orchestrator
        .search_booking_window(&host(), Query::new().with_filter("channel", json!("mobile")))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);

    let misses = h
        .orchestrator
        .search_booking_window(&host(), Query::new().with_filter("channel", json!("web")))
        .await
        .unwrap();
    assert!(misses.is_empty());
}

#[tokio::test]
async fn reread_booking_carries_identical_receipt() {
    let h = harness();
    let listing = seed_listing(&h).await;
    let today = h.clock.today();

    let booking = h
        .orchestrator
        .make_booking(&client(), request(listing.id, today, today + Duration::days(3)))
        .await
        .unwrap();

    let reread = h.bookings.get(booking.id).await.unwrap().unwrap();
    assert_eq!(reread.receipt, booking.receipt);
}

#[tokio::test]
async fn concurrent_requests_for_one_unit_cannot_both_book() {
    let h = harness();
    let listing = seed_listing(&h).await;
    let today = h.clock.today();
    let orchestrator = Arc::new(h.orchestrator);

    // identical single-day stays: whichever lands second must observe the
    // first one's write and reject as a conflict
    let a = tokio::spawn({
        let orchestrator = orchestrator.clone();
        let req = request(listing.id, today, today);
        async move { orchestrator.make_booking(&client(), req).await }
    });
    let b = tokio::spawn({
        let orchestrator = orchestrator.clone();
        let req = request(listing.id, today, today);
        async move { orchestrator.make_booking(&client(), req).await }
    });

    let outcomes = [a.await.unwrap(), b.await.unwrap()];
    let accepted = outcomes.iter().filter(|r| r.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|r| matches!(r, Err(BookingError::Conflict { .. })))
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(conflicts, 1);
}

#[tokio::test]
async fn listing_update_is_owner_scoped() {
    let h = harness();
    let listing = seed_listing(&h).await;

    // a client in the same tenant who does not own the listing is denied
    let stranger = Actor::new("guest-3", "fed-guest-3", Some("org1".into()), vec![Role::Client]);
    let err = h
        .manager
        .update_listing(
            &stranger,
            listing.id,
            ListingPatch {
                amount: Some(dec(250)),
                ..ListingPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, roost_catalog::CatalogError::NotFound));

    // the tenant admin may update it
    let updated = h
        .manager
        .update_listing(
            &host(),
            listing.id,
            ListingPatch {
                amount: Some(dec(250)),
                ..ListingPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.premium.basic_premium, dec(250));

    // cross-tenant admins cannot even see it
    let outsider = Actor::new("a2", "fed-a2", Some("org9".into()), vec![Role::Admin]);
    assert!(h.manager.get_listing(&outsider, listing.id).await.is_err());
}
