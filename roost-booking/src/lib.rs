pub mod availability;
pub mod memory;
pub mod models;
pub mod orchestrator;
pub mod repository;

pub use availability::{AvailabilityChecker, Decision, RejectReason};
pub use memory::{InMemoryBookingStore, InMemoryListingStore};
pub use models::{Booking, BookingInterval, BookingStatus, CreateBookingRequest};
pub use orchestrator::{BookingError, BookingOrchestrator};
pub use repository::BookingStore;
