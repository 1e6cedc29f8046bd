use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Map;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use roost_core::{Actor, Clock, OrgScoped, Query, ScopeFilter, StoreError};
use roost_catalog::{validate_charge_items, ListingStore, PricingEngine, PricingError};

use crate::availability::{AvailabilityChecker, Decision, RejectReason};
use crate::models::{Booking, BookingStatus, CreateBookingRequest, PROTECTED_FIELDS};
use crate::repository::BookingStore;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("please pass valid start and end dates")]
    InvalidDateRange,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("this unit already has a booking")]
    Conflict { conflicting_booking: Option<Uuid> },

    #[error("active unit passed does not exist")]
    NotFound,

    #[error("storage failure: {0}")]
    Transient(String),
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        BookingError::Transient(err.to_string())
    }
}

impl From<PricingError> for BookingError {
    fn from(err: PricingError) -> Self {
        BookingError::InvalidInput(err.to_string())
    }
}

/// Composes the scope filter, the availability checker and the pricing
/// engine into the booking workflow. The only component here with side
/// effects: one availability read, then one booking write, strictly in
/// that order.
///
/// The read and the write are not a single storage transaction, so two
/// concurrent requests for the same unit could otherwise both pass the
/// availability check. A per-unit async mutex serializes them; the second
/// request observes the first one's write.
pub struct BookingOrchestrator {
    bookings: Arc<dyn BookingStore>,
    listings: Arc<dyn ListingStore>,
    clock: Arc<dyn Clock>,
    checker: AvailabilityChecker,
    pricing: PricingEngine,
    unit_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl BookingOrchestrator {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        listings: Arc<dyn ListingStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            checker: AvailabilityChecker::new(bookings.clone()),
            bookings,
            listings,
            clock,
            pricing: PricingEngine::new(),
            unit_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Make a booking for a client.
    ///
    /// Request → scope stamps → availability check → receipt → persisted
    /// record. The booking starts in `PENDING` and carries the listing's
    /// organisation, so the tenant that owns the unit sees it.
    pub async fn make_booking(
        &self,
        actor: &Actor,
        request: CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        validate_charge_items("amenities", &request.amenities)?;

        let interval = request.interval();
        let lock = self.unit_lock(request.listing_id).await;
        let _guard = lock.lock().await;

        let today = self.clock.today();
        match self.checker.check(&interval, today).await? {
            Decision::Rejected {
                reason: RejectReason::InvalidDateRange,
                ..
            } => return Err(BookingError::InvalidDateRange),
            Decision::Rejected {
                reason: RejectReason::Conflict,
                conflicting_booking,
            } => {
                warn!(
                    listing_id = %request.listing_id,
                    conflicting = ?conflicting_booking,
                    "booking rejected: unit occupied"
                );
                return Err(BookingError::Conflict {
                    conflicting_booking,
                });
            }
            Decision::Accepted => {}
        }

        let listing = self
            .listings
            .find_active(request.listing_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        let number_of_days = interval.number_of_days();
        let receipt = self.pricing.compute_receipt(
            listing.premium.basic_premium,
            number_of_days,
            &listing.premium.statutory_premiums,
            &listing.premium.loadings,
            &listing.premium.discounts,
            &request.amenities,
            today,
        )?;

        let now = self.clock.now();
        let mut booking = Booking {
            id: Uuid::new_v4(),
            listing_id: listing.id,
            organisation_id: None,
            feduid: actor.feduid.clone(),
            client_id: actor.id.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            number_of_days,
            status: BookingStatus::Pending,
            receipt,
            extra: strip_protected(request.extra),
            created_at: now,
            updated_at: now,
        };
        // The booking lives in the tenant that owns the unit, not the
        // client's own organisation.
        booking.set_organisation_id(listing.organisation_id.clone());

        let saved = self.bookings.save(&booking).await?;
        info!(
            booking_id = %saved.id,
            listing_id = %saved.listing_id,
            amount = %saved.receipt.amount,
            "booking created"
        );
        Ok(saved)
    }

    /// Scope-filtered booking listing; a `client` actor only sees their
    /// own bookings.
    pub async fn list_bookings(
        &self,
        actor: &Actor,
        mut query: Query,
    ) -> Result<Vec<Booking>, BookingError> {
        ScopeFilter::apply_query_scope(actor, &mut query, false);
        ScopeFilter::apply_self_scope(actor, &mut query);
        Ok(self.bookings.find(&query).await?)
    }

    /// Scope-filtered search over bookings with caller-supplied custom
    /// field filters carried through.
    pub async fn search_booking_window(
        &self,
        actor: &Actor,
        mut query: Query,
    ) -> Result<Vec<Booking>, BookingError> {
        ScopeFilter::apply_query_scope(actor, &mut query, false);
        Ok(self.bookings.find(&query).await?)
    }

    async fn unit_lock(&self, listing_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.unit_locks.lock().await;
        locks.entry(listing_id).or_default().clone()
    }
}

fn strip_protected(mut extra: Map<String, serde_json::Value>) -> Map<String, serde_json::Value> {
    for field in PROTECTED_FIELDS {
        extra.remove(field);
    }
    extra
}
