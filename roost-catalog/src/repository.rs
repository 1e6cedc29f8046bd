use async_trait::async_trait;
use uuid::Uuid;

use roost_core::{Query, StoreError};

use crate::listing::Listing;

/// Storage collaborator for listings. Implemented outside this core;
/// injected into the services that need it.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Single-record lookup for a listing in `ACTIVE` status.
    async fn find_active(&self, id: Uuid) -> Result<Option<Listing>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Listing>, StoreError>;

    async fn find(&self, query: &Query) -> Result<Vec<Listing>, StoreError>;

    /// Single-document upsert.
    async fn save(&self, listing: &Listing) -> Result<Listing, StoreError>;
}
