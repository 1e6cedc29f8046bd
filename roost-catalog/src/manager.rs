use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use roost_core::{Actor, Clock, OrgScoped, Query, Role, ScopeFilter, StoreError};

use crate::listing::{
    CreateListingRequest, Listing, ListingPatch, ListingStatus, PremiumSchedule,
};
use crate::pricing::PricingError;
use crate::repository::ListingStore;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] PricingError),

    #[error("listing not found or access denied")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Listing management: create, patch and read listings with their premium
/// schedules, always inside the caller's scope.
pub struct ListingManager {
    store: Arc<dyn ListingStore>,
    clock: Arc<dyn Clock>,
}

impl ListingManager {
    pub fn new(store: Arc<dyn ListingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create a listing. All four charge-item arrays are validated
    /// wholesale before anything is persisted; the actor's organisation and
    /// user id are stamped over whatever the caller supplied.
    pub async fn create_listing(
        &self,
        actor: &Actor,
        request: CreateListingRequest,
    ) -> Result<Listing, CatalogError> {
        let premium = PremiumSchedule {
            basic_premium: request.amount,
            statutory_premiums: request.statutory_premiums,
            loadings: request.loadings,
            discounts: request.discounts,
            amenities: request.amenities,
        };
        premium.validate()?;

        let now = self.clock.now();
        let mut listing = Listing {
            id: Uuid::new_v4(),
            organisation_id: None,
            user_id: actor.id.clone(),
            name: request.name,
            description: request.description,
            listing_type: request.listing_type,
            longitude: request.longitude,
            latitude: request.latitude,
            status: ListingStatus::Active,
            premium,
            created_at: now,
            updated_at: now,
        };
        ScopeFilter::apply_save_scope(actor, &mut listing);

        let saved = self.store.save(&listing).await?;
        info!(listing_id = %saved.id, "listing created");
        Ok(saved)
    }

    /// Patch a listing. Owner-scoped: only the owner, or an admin or
    /// superadmin, may modify it; anyone else sees the same "not found" a
    /// cross-tenant read would.
    pub async fn update_listing(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: ListingPatch,
    ) -> Result<Listing, CatalogError> {
        let mut listing = self
            .store
            .get(id)
            .await?
            .filter(|listing| Self::visible_to(actor, listing))
            .ok_or(CatalogError::NotFound)?;

        if !ScopeFilter::can_modify(actor, &listing.user_id) {
            return Err(CatalogError::NotFound);
        }

        if let Some(items) = &patch.statutory_premiums {
            crate::listing::validate_charge_items("statutoryPremiums", items)?;
        }
        if let Some(items) = &patch.loadings {
            crate::listing::validate_charge_items("loadings", items)?;
        }
        if let Some(items) = &patch.discounts {
            crate::listing::validate_charge_items("discounts", items)?;
        }
        if let Some(items) = &patch.amenities {
            crate::listing::validate_charge_items("amenities", items)?;
        }

        if let Some(name) = patch.name {
            listing.name = name;
        }
        if let Some(description) = patch.description {
            listing.description = description;
        }
        if let Some(listing_type) = patch.listing_type {
            listing.listing_type = listing_type;
        }
        if let Some(amount) = patch.amount {
            listing.premium.basic_premium = amount;
        }
        if let Some(status) = patch.status {
            listing.status = status;
        }
        if let Some(items) = patch.statutory_premiums {
            listing.premium.statutory_premiums = items;
        }
        if let Some(items) = patch.loadings {
            listing.premium.loadings = items;
        }
        if let Some(items) = patch.discounts {
            listing.premium.discounts = items;
        }
        if let Some(items) = patch.amenities {
            listing.premium.amenities = items;
        }
        listing.updated_at = self.clock.now();

        let saved = self.store.save(&listing).await?;
        info!(listing_id = %saved.id, "listing updated");
        Ok(saved)
    }

    pub async fn get_listing(&self, actor: &Actor, id: Uuid) -> Result<Listing, CatalogError> {
        self.store
            .get(id)
            .await?
            .filter(|listing| Self::visible_to(actor, listing))
            .ok_or(CatalogError::NotFound)
    }

    pub async fn list_listings(
        &self,
        actor: &Actor,
        mut query: Query,
    ) -> Result<Vec<Listing>, CatalogError> {
        ScopeFilter::apply_query_scope(actor, &mut query, false);
        Ok(self.store.find(&query).await?)
    }

    fn visible_to(actor: &Actor, listing: &Listing) -> bool {
        if actor.is_role(Role::Superadmin) {
            return true;
        }
        match (&actor.organisation_id, listing.organisation_id()) {
            (Some(own), Some(theirs)) => own == theirs,
            _ => false,
        }
    }
}
