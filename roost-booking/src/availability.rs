use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use roost_core::StoreError;

use crate::models::BookingInterval;
use crate::repository::BookingStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InvalidDateRange,
    Conflict,
}

/// Outcome of an availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Rejected {
        reason: RejectReason,
        conflicting_booking: Option<Uuid>,
    },
}

impl Decision {
    fn invalid_date_range() -> Self {
        Decision::Rejected {
            reason: RejectReason::InvalidDateRange,
            conflicting_booking: None,
        }
    }
}

/// Decides whether a proposed stay conflicts with existing reservations
/// for the same unit.
///
/// The conflict rule: an occupying booking whose end date falls on or
/// before the proposed start still reserves the unit through that date,
/// so the proposal is rejected. One lookup per check; a lookup failure is
/// surfaced, never treated as "no conflict".
pub struct AvailabilityChecker {
    store: Arc<dyn BookingStore>,
}

impl AvailabilityChecker {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    pub async fn check(
        &self,
        interval: &BookingInterval,
        today: NaiveDate,
    ) -> Result<Decision, StoreError> {
        // Date preconditions, checked before any lookup.
        if interval.start_date < today
            || interval.end_date < today
            || interval.start_date > interval.end_date
        {
            return Ok(Decision::invalid_date_range());
        }

        match self
            .store
            .find_occupying(interval.listing_id, interval.start_date)
            .await?
        {
            Some(existing) => Ok(Decision::Rejected {
                reason: RejectReason::Conflict,
                conflicting_booking: Some(existing.id),
            }),
            None => Ok(Decision::Accepted),
        }
    }
}
