// Table seating: groups attendees into seating units and places them on tables.
// The planner and everything below it is pure and synchronous; the service
// runs it inside tokio::task::spawn_blocking.

pub mod balance;
pub mod diagnostics;
pub mod error;
pub mod handlers;
pub mod merge;
pub mod model;
pub mod placer;
pub mod planner;
pub mod service;
pub mod store;
pub mod units;

// Re-export the public API consumed by other modules (state, routes, main).
pub use error::SeatingError;
pub use service::SeatingDefaults;
pub use store::{PgSeatingStore, SeatingStore};
