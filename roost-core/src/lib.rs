pub mod clock;
pub mod error;
pub mod identity;
pub mod scope;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::StoreError;
pub use identity::{Actor, Role};
pub use scope::{OrgScoped, Query, ScopeContext, ScopeFilter, DENIED_ORGANISATION};
