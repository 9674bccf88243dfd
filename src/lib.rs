//! `pco-history` - consolidated `Planning Center` activity for one person.
//!
//! Looks a person up across the People, Services, Check-Ins, Registrations and
//! Groups APIs and folds the paginated, cross-referenced results into a single
//! summary covering the recent past.

pub mod config;
pub mod constants;
pub mod error;
pub mod lookup;
pub mod planning_center;
pub mod types;

pub use error::{Error, Result};
pub use lookup::{LookupResult, PersonLookup, Section};
