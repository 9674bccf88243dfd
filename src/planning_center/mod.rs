//! Planning Center API integration.
//!
//! Provides the authenticated, pagination-aware fetch client, typed decoding
//! of upstream documents, and URL construction for every resource a person
//! lookup reads.

/// API client for Planning Center Online requests
pub mod api;
/// Upstream URL construction
pub mod endpoints;
/// Data types representing Planning Center resources
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key components
pub use api::{fetch_collection, fetch_record, Fetch, PlanningCenterClient};
pub use endpoints::Endpoints;
