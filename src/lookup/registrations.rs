//! Registrations domain: registered event instances.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants::labels::UNKNOWN_EVENT;
use crate::constants::limits::REGISTRATIONS_LISTED;
use crate::error::Result;
use crate::lookup::window::DateRange;
use crate::planning_center::types::{EventInstanceAttributes, Resource};
use crate::planning_center::{fetch_collection, Endpoints, Fetch};
use crate::types::PersonId;

/// One registered event instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationEntry {
    /// Event display name
    pub event_name: String,
    /// Instance start
    pub starts_at: Option<DateTime<Utc>>,
    /// Instance end
    pub ends_at: Option<DateTime<Utc>>,
    /// Whether the instance spans whole days
    pub all_day_event: bool,
}

impl From<Resource<EventInstanceAttributes>> for RegistrationEntry {
    fn from(instance: Resource<EventInstanceAttributes>) -> Self {
        let attrs = instance.attributes;
        Self {
            event_name: attrs
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_EVENT.to_string()),
            starts_at: attrs.starts_at,
            ends_at: attrs.ends_at,
            all_day_event: attrs.all_day_event.unwrap_or(false),
        }
    }
}

/// Registrations domain summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationsSummary {
    /// Registrations in the window, before truncation
    pub total_registrations: usize,
    /// Most recent registrations, latest start first
    pub registration_list: Vec<RegistrationEntry>,
    /// Window the registrations were read over
    pub date_range: DateRange,
}

/// Build the registrations summary for `person`
pub async fn aggregate<F>(
    fetcher: &F,
    endpoints: &Endpoints,
    person: &PersonId,
    window: DateRange,
) -> Result<RegistrationsSummary>
where
    F: Fetch + ?Sized,
{
    let instances: Vec<Resource<EventInstanceAttributes>> =
        fetch_collection(fetcher, &endpoints.event_instances(person, window.cutoff())).await?;

    let total_registrations = instances.len();
    let mut registration_list: Vec<RegistrationEntry> =
        instances.into_iter().map(RegistrationEntry::from).collect();
    // Upstream ordering is not trusted
    registration_list.sort_by(|a, b| b.starts_at.cmp(&a.starts_at));
    registration_list.truncate(REGISTRATIONS_LISTED);

    Ok(RegistrationsSummary {
        total_registrations,
        registration_list,
        date_range: window,
    })
}
