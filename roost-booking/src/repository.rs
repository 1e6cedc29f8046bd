use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use roost_core::{Query, StoreError};

use crate::models::Booking;

/// Storage collaborator for bookings. Implemented outside this core;
/// injected into the availability checker and the orchestrator.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Single-record lookup: any booking for the unit in an occupying
    /// status whose end date falls on or before `before_or_on`.
    async fn find_occupying(
        &self,
        listing_id: Uuid,
        before_or_on: NaiveDate,
    ) -> Result<Option<Booking>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    async fn find(&self, query: &Query) -> Result<Vec<Booking>, StoreError>;

    /// Single-document upsert.
    async fn save(&self, booking: &Booking) -> Result<Booking, StoreError>;
}
