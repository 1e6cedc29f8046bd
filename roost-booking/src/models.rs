use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use roost_core::OrgScoped;
use roost_catalog::{ChargeItem, Receipt};

/// Booking lifecycle states. Later transitions (payment confirmation,
/// check-in) are driven by collaborators outside this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Active,
    CheckedIn,
    CheckedOut,
    Cleaning,
    Suspended,
    Booked,
    Disabled,
}

impl BookingStatus {
    /// Whether a booking in this state still blocks new reservations for
    /// the same unit. Only checked-out and disabled bookings release it.
    pub fn is_occupying(&self) -> bool {
        !matches!(self, BookingStatus::CheckedOut | BookingStatus::Disabled)
    }
}

/// A proposed stay for a unit, at calendar-day granularity, inclusive of
/// both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInterval {
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl BookingInterval {
    pub fn new(listing_id: Uuid, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            listing_id,
            start_date,
            end_date,
        }
    }

    pub fn number_of_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Caller-supplied fields a booking request may not set; the orchestrator
/// stamps these itself.
pub const PROTECTED_FIELDS: [&str; 6] = [
    "listingId",
    "organisationId",
    "feduid",
    "client",
    "clientId",
    "numberOfDays",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Amenities the client selected for the stay.
    #[serde(default)]
    pub amenities: Vec<ChargeItem>,
    /// Caller-defined extra fields, carried onto the booking minus the
    /// protected keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreateBookingRequest {
    pub fn interval(&self) -> BookingInterval {
        BookingInterval::new(self.listing_id, self.start_date, self.end_date)
    }
}

/// A persisted reservation. Created by the orchestrator only after the
/// availability check accepts; the receipt is never recomputed on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub organisation_id: Option<String>,
    pub feduid: String,
    pub client_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_days: i64,
    pub status: BookingStatus,
    pub receipt: Receipt,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrgScoped for Booking {
    fn organisation_id(&self) -> Option<&str> {
        self.organisation_id.as_deref()
    }

    fn set_organisation_id(&mut self, organisation_id: Option<String>) {
        self.organisation_id = organisation_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_day_count_is_inclusive() {
        let id = Uuid::new_v4();
        let start = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 12).unwrap();
        assert_eq!(BookingInterval::new(id, start, end).number_of_days(), 4);
        assert_eq!(BookingInterval::new(id, start, start).number_of_days(), 1);
    }

    #[test]
    fn only_terminal_states_release_the_unit() {
        assert!(BookingStatus::Pending.is_occupying());
        assert!(BookingStatus::Active.is_occupying());
        assert!(BookingStatus::CheckedIn.is_occupying());
        assert!(BookingStatus::Suspended.is_occupying());
        assert!(!BookingStatus::CheckedOut.is_occupying());
        assert!(!BookingStatus::Disabled.is_occupying());
    }
}
