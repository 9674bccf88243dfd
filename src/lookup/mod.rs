//! Person lookup.
//!
//! Fetches the base person record, then runs the four domain aggregators
//! concurrently. Each domain either succeeds or records its own error; only a
//! failure to load the person aborts the lookup.

/// Check-Ins domain
pub mod check_ins;
mod enrich;
/// Groups domain
pub mod groups;
/// Registrations domain
pub mod registrations;
/// Services domain
pub mod services;
/// Lookup date window
pub mod window;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::planning_center::types::PersonAttributes;
use crate::planning_center::{fetch_record, Endpoints, Fetch, PlanningCenterClient};
use crate::types::PersonId;

pub use check_ins::CheckInsSummary;
pub use groups::GroupsSummary;
pub use registrations::RegistrationsSummary;
pub use services::ServicesSummary;
pub use window::DateRange;

/// The person a lookup was run for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Identifier the lookup was requested with
    pub id: String,
    /// Display name
    pub name: String,
    /// Profile creation time
    pub created_at: Option<DateTime<Utc>>,
}

/// Outcome of one domain: its summary, or the reason it could not be built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Section<T> {
    /// Domain summary
    Loaded(T),
    /// Domain failed; the rest of the lookup is unaffected
    Failed {
        /// Error message
        error: String,
    },
}

impl<T> Section<T> {
    fn from_result(domain: &'static str, result: Result<T>) -> Self {
        match result {
            Ok(summary) => Self::Loaded(summary),
            Err(e) => {
                warn!(domain, error = %e, "Domain aggregation failed");
                Self::Failed { error: e.to_string() }
            }
        }
    }

    /// Summary, if the domain loaded
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(summary) => Some(summary),
            Self::Failed { .. } => None,
        }
    }

    /// Error message, if the domain failed
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Loaded(_) => None,
            Self::Failed { error } => Some(error),
        }
    }
}

/// Consolidated activity for one person
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    /// Base person record
    pub person: Person,
    /// Team rosters and scheduling
    pub services: Section<ServicesSummary>,
    /// Attendance by event
    pub check_ins: Section<CheckInsSummary>,
    /// Event registrations
    pub registrations: Section<RegistrationsSummary>,
    /// Group memberships
    pub groups: Section<GroupsSummary>,
}

/// Runs person lookups against one upstream
pub struct PersonLookup<F> {
    fetcher: F,
    endpoints: Endpoints,
    lookback_months: u32,
}

impl PersonLookup<PlanningCenterClient> {
    /// Lookup backed by the live Planning Center API
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            PlanningCenterClient::new(config)?,
            Endpoints::from_config(config),
            config.lookback_months,
        ))
    }
}

impl<F: Fetch> PersonLookup<F> {
    /// Create a lookup over `fetcher`
    pub fn new(fetcher: F, endpoints: Endpoints, lookback_months: u32) -> Self {
        Self { fetcher, endpoints, lookback_months }
    }

    /// Upstream this lookup reads from
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Look up `person_id` with the window ending now
    pub async fn lookup(&self, person_id: &PersonId) -> Result<LookupResult> {
        self.lookup_at(person_id, Utc::now()).await
    }

    /// Look up `person_id` with the window ending at `now`
    pub async fn lookup_at(&self, person_id: &PersonId, now: DateTime<Utc>) -> Result<LookupResult> {
        info!(person = %person_id, "Looking up person");

        let record = fetch_record::<PersonAttributes, _>(&self.fetcher, &self.endpoints.person(person_id))
            .await
            .map_err(|e| Error::person_unavailable(person_id.as_str(), e))?;
        let person = Person {
            id: person_id.to_string(),
            name: record.attributes.display_name(),
            created_at: record.attributes.created_at,
        };

        let window = DateRange::months_back(now, self.lookback_months);
        let (services, check_ins, registrations, groups) = futures::join!(
            services::aggregate(&self.fetcher, &self.endpoints, person_id, window),
            check_ins::aggregate(&self.fetcher, &self.endpoints, person_id, window),
            registrations::aggregate(&self.fetcher, &self.endpoints, person_id, window),
            groups::aggregate(&self.fetcher, &self.endpoints, person_id),
        );

        let result = LookupResult {
            person,
            services: Section::from_result("services", services),
            check_ins: Section::from_result("check_ins", check_ins),
            registrations: Section::from_result("registrations", registrations),
            groups: Section::from_result("groups", groups),
        };

        info!(
            person = %person_id,
            services = result.services.error().is_none(),
            check_ins = result.check_ins.error().is_none(),
            registrations = result.registrations.error().is_none(),
            groups = result.groups.error().is_none(),
            "Lookup finished"
        );
        Ok(result)
    }
}
