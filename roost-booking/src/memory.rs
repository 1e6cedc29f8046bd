use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use roost_core::{Query, StoreError};
use roost_catalog::{Listing, ListingStatus, ListingStore};

use crate::models::Booking;
use crate::repository::BookingStore;

/// In-memory booking store used by tests and demos. `set_unavailable`
/// makes every call fail with a transient error, to exercise the
/// propagation path.
#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: Mutex<HashMap<Uuid, Booking>>,
    unavailable: AtomicBool,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Transient("connection lost".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn find_occupying(
        &self,
        listing_id: Uuid,
        before_or_on: NaiveDate,
    ) -> Result<Option<Booking>, StoreError> {
        self.check_available()?;
        let bookings = self.bookings.lock().expect("booking store lock");
        Ok(bookings
            .values()
            .find(|b| {
                b.listing_id == listing_id
                    && b.status.is_occupying()
                    && b.end_date <= before_or_on
            })
            .cloned())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        self.check_available()?;
        let bookings = self.bookings.lock().expect("booking store lock");
        Ok(bookings.get(&id).cloned())
    }

    async fn find(&self, query: &Query) -> Result<Vec<Booking>, StoreError> {
        self.check_available()?;
        let bookings = self.bookings.lock().expect("booking store lock");
        Ok(bookings
            .values()
            .filter(|b| booking_matches(b, query))
            .cloned()
            .collect())
    }

    async fn save(&self, booking: &Booking) -> Result<Booking, StoreError> {
        self.check_available()?;
        let mut bookings = self.bookings.lock().expect("booking store lock");
        bookings.insert(booking.id, booking.clone());
        Ok(booking.clone())
    }
}

fn booking_matches(booking: &Booking, query: &Query) -> bool {
    if let Some(org) = &query.organisation_id {
        if booking.organisation_id.as_deref() != Some(org.as_str()) {
            return false;
        }
    }
    if let Some(feduid) = &query.feduid {
        if booking.feduid != *feduid {
            return false;
        }
    }
    if let Some(user_id) = &query.user_id {
        if booking.client_id != *user_id {
            return false;
        }
    }
    query
        .filters
        .iter()
        .all(|(key, value)| booking.extra.get(key) == Some(value))
}

/// In-memory listing store used by tests and demos.
#[derive(Default)]
pub struct InMemoryListingStore {
    listings: Mutex<HashMap<Uuid, Listing>>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn find_active(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        let listings = self.listings.lock().expect("listing store lock");
        Ok(listings
            .get(&id)
            .filter(|l| l.status == ListingStatus::Active)
            .cloned())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        let listings = self.listings.lock().expect("listing store lock");
        Ok(listings.get(&id).cloned())
    }

    async fn find(&self, query: &Query) -> Result<Vec<Listing>, StoreError> {
        let listings = self.listings.lock().expect("listing store lock");
        Ok(listings
            .values()
            .filter(|l| listing_matches(l, query))
            .cloned()
            .collect())
    }

    async fn save(&self, listing: &Listing) -> Result<Listing, StoreError> {
        let mut listings = self.listings.lock().expect("listing store lock");
        listings.insert(listing.id, listing.clone());
        Ok(listing.clone())
    }
}

fn listing_matches(listing: &Listing, query: &Query) -> bool {
    if let Some(org) = &query.organisation_id {
        if listing.organisation_id.as_deref() != Some(org.as_str()) {
            return false;
        }
    }
    if let Some(user_id) = &query.user_id {
        if listing.user_id != *user_id {
            return false;
        }
    }
    true
}
