pub mod listing;
pub mod manager;
pub mod pricing;
pub mod repository;

pub use listing::{
    validate_charge_items, ChargeItem, CreateListingRequest, Listing, ListingPatch,
    ListingStatus, PremiumSchedule,
};
pub use manager::{CatalogError, ListingManager};
pub use pricing::{AppliedCharge, PricingEngine, PricingError, Receipt};
pub use repository::ListingStore;
