//! API Module
//!
//! Admin HTTP surface over the cache service, remote store and listeners.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
