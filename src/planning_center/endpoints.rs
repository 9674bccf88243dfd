//! Upstream URL construction.
//!
//! One method per resource the lookup reads. Collection URLs carry their
//! filters and ordering; the page size is added by `Fetch::fetch_all_pages`.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::Config;
use crate::types::PersonId;

/// URL builder rooted at the configured API origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    /// Create endpoints under `base` (trailing slashes are ignored)
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self { base: base.trim_end_matches('/').to_string() }
    }

    /// Endpoints for the configured API origin
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base.as_str())
    }

    /// Person record
    pub fn person(&self, person: &PersonId) -> String {
        format!("{}/people/v2/people/{person}", self.base)
    }

    /// Teams the person is currently rostered on
    pub fn person_teams(&self, person: &PersonId) -> String {
        format!("{}/services/v2/people/{person}/teams", self.base)
    }

    /// Scheduling assignments on plans dated at or after `cutoff`, newest first
    pub fn plan_people(&self, person: &PersonId, cutoff: DateTime<Utc>) -> String {
        format!(
            "{}/services/v2/people/{person}/plan_people?where[sort_date][gte]={}&order=-sort_date",
            self.base,
            query_timestamp(cutoff)
        )
    }

    /// Single team
    pub fn team(&self, team_id: &str) -> String {
        format!("{}/services/v2/teams/{team_id}", self.base)
    }

    /// Single service type
    pub fn service_type(&self, service_type_id: &str) -> String {
        format!("{}/services/v2/service_types/{service_type_id}", self.base)
    }

    /// Check-ins created at or after `cutoff`, newest first
    pub fn check_ins(&self, person: &PersonId, cutoff: DateTime<Utc>) -> String {
        format!(
            "{}/check-ins/v2/people/{person}/check_ins?where[created_at][gte]={}&order=-created_at",
            self.base,
            query_timestamp(cutoff)
        )
    }

    /// Single check-in event
    pub fn check_in_event(&self, event_id: &str) -> String {
        format!("{}/check-ins/v2/events/{event_id}", self.base)
    }

    /// Registered event instances, past and future, starting at or after `cutoff`
    pub fn event_instances(&self, person: &PersonId, cutoff: DateTime<Utc>) -> String {
        format!(
            "{}/registrations/v2/people/{person}/event_instances?filter=future,past&where[starts_at][gte]={}&order=-starts_at",
            self.base,
            query_timestamp(cutoff)
        )
    }

    /// Group memberships
    pub fn memberships(&self, person: &PersonId) -> String {
        format!("{}/groups/v2/people/{person}/memberships", self.base)
    }

    /// Single group
    pub fn group(&self, group_id: &str) -> String {
        format!("{}/groups/v2/groups/{group_id}", self.base)
    }
}

fn query_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use chrono::TimeZone;

    #[test]
    fn builds_filtered_collection_urls() {
        let endpoints = Endpoints::new("https://api.planningcenteronline.com/");
        let person = PersonId::parse("42").unwrap();
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap();

        assert_eq!(endpoints.person(&person), "https://api.planningcenteronline.com/people/v2/people/42");
        assert_eq!(
            endpoints.check_ins(&person, cutoff),
            "https://api.planningcenteronline.com/check-ins/v2/people/42/check_ins?where[created_at][gte]=2024-01-15T08:30:00Z&order=-created_at"
        );
        assert_eq!(
            endpoints.plan_people(&person, cutoff),
            "https://api.planningcenteronline.com/services/v2/people/42/plan_people?where[sort_date][gte]=2024-01-15T08:30:00Z&order=-sort_date"
        );
        assert!(endpoints
            .event_instances(&person, cutoff)
            .contains("where[starts_at][gte]=2024-01-15T08:30:00Z"));
    }
}
