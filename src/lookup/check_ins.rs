//! Check-Ins domain: attendance grouped by event.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use futures::future;
use serde::Serialize;
use tracing::debug;

use crate::constants::labels::UNKNOWN_EVENT;
use crate::constants::limits::RECENT_CHECK_INS_PER_EVENT;
use crate::error::Result;
use crate::lookup::enrich::best_effort;
use crate::lookup::window::DateRange;
use crate::planning_center::types::{CheckInAttributes, CheckInEventAttributes, Resource};
use crate::planning_center::{fetch_collection, fetch_record, Endpoints, Fetch};
use crate::types::PersonId;

/// One check-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInEntry {
    /// Check-in time
    pub date: DateTime<Utc>,
    /// Check-in kind as reported upstream
    pub kind: Option<String>,
}

/// Attendance at one event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCheckIns {
    /// Check-ins in the window
    pub count: usize,
    /// Earliest check-in
    pub first_check_in: Option<DateTime<Utc>>,
    /// Latest check-in
    pub last_check_in: Option<DateTime<Utc>>,
    /// Event display name
    pub event_name: String,
    /// Most recent check-ins, newest first
    pub recent_check_ins: Vec<CheckInEntry>,
}

impl EventCheckIns {
    fn record(&mut self, entry: CheckInEntry) {
        self.count += 1;
        self.first_check_in = Some(self.first_check_in.map_or(entry.date, |d| d.min(entry.date)));
        self.last_check_in = Some(self.last_check_in.map_or(entry.date, |d| d.max(entry.date)));
        self.recent_check_ins.push(entry);
    }
}

/// Check-Ins domain summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInsSummary {
    /// Check-in records returned for the window
    pub total_check_ins: usize,
    /// Attendance keyed by event identifier
    pub check_ins_by_event: BTreeMap<String, EventCheckIns>,
    /// Window the check-ins were read over
    pub date_range: DateRange,
}

/// Build the check-ins summary for `person`
pub async fn aggregate<F>(
    fetcher: &F,
    endpoints: &Endpoints,
    person: &PersonId,
    window: DateRange,
) -> Result<CheckInsSummary>
where
    F: Fetch + ?Sized,
{
    let check_ins: Vec<Resource<CheckInAttributes>> =
        fetch_collection(fetcher, &endpoints.check_ins(person, window.cutoff())).await?;

    let mut by_event: BTreeMap<String, EventCheckIns> = BTreeMap::new();
    for check_in in &check_ins {
        let (Some(event_id), Some(date)) = (check_in.relationships.id_of("event"), check_in.attributes.created_at) else {
            debug!(check_in = %check_in.id, "Check-in without event or time skipped");
            continue;
        };
        by_event.entry(event_id.to_string()).or_default().record(CheckInEntry {
            date,
            kind: check_in.attributes.kind.clone(),
        });
    }

    let event_ids: Vec<String> = by_event.keys().cloned().collect();
    let names = future::join_all(event_ids.iter().map(|id| async move {
        let url = endpoints.check_in_event(id);
        best_effort("event", id, fetch_record::<CheckInEventAttributes, _>(fetcher, &url))
            .await
            .and_then(|event| event.attributes.name)
    }))
    .await;

    for (id, name) in event_ids.iter().zip(names) {
        if let Some(event) = by_event.get_mut(id) {
            event.event_name = name.unwrap_or_else(|| UNKNOWN_EVENT.to_string());
            event.recent_check_ins.sort_by(|a, b| b.date.cmp(&a.date));
            event.recent_check_ins.truncate(RECENT_CHECK_INS_PER_EVENT);
        }
    }

    Ok(CheckInsSummary {
        total_check_ins: check_ins.len(),
        check_ins_by_event: by_event,
        date_range: window,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::planning_center::testing::FakeUpstream;
    use crate::planning_center::types::parse_timestamp;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn check_in(id: &str, event: &str, at: &str, kind: &str) -> Value {
        json!({
            "type": "CheckIn",
            "id": id,
            "attributes": {"created_at": at, "kind": kind},
            "relationships": {"event": {"data": {"type": "Event", "id": event}}}
        })
    }

    fn window() -> DateRange {
        DateRange::months_back(Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap(), 9)
    }

    #[tokio::test]
    async fn groups_by_event_and_names_events() {
        let endpoints = Endpoints::new("https://pco.test");
        let person = PersonId::parse("7").unwrap();
        let window = window();
        let mut rows: Vec<Value> = (1..=7)
            .map(|day| check_in(&format!("c{day}"), "E1", &format!("2024-08-0{day}T09:00:00Z"), "Regular"))
            .collect();
        rows.push(check_in("v1", "E2", "2024-05-05T18:00:00Z", "Volunteer"));
        rows.push(json!({"id": "orphan", "attributes": {"created_at": "2024-05-05T18:00:00Z"}}));

        let upstream = FakeUpstream::default()
            .page(&endpoints.check_ins(&person, window.cutoff()), Value::Array(rows))
            .record(&endpoints.check_in_event("E1"), json!({"id": "E1", "attributes": {"name": "Sunday Kids"}}))
            .failing(&endpoints.check_in_event("E2"), "Internal Server Error");

        let summary = aggregate(&upstream, &endpoints, &person, window).await.unwrap();
        assert_eq!(summary.total_check_ins, 9);

        let kids = &summary.check_ins_by_event["E1"];
        assert_eq!(kids.event_name, "Sunday Kids");
        assert_eq!(kids.count, 7);
        assert_eq!(kids.first_check_in, parse_timestamp("2024-08-01T09:00:00Z"));
        assert_eq!(kids.last_check_in, parse_timestamp("2024-08-07T09:00:00Z"));
        assert_eq!(kids.recent_check_ins.len(), 5);
        assert_eq!(Some(kids.recent_check_ins[0].date), parse_timestamp("2024-08-07T09:00:00Z"));

        let serving = &summary.check_ins_by_event["E2"];
        assert_eq!(serving.event_name, UNKNOWN_EVENT);
        assert_eq!(serving.recent_check_ins[0].kind.as_deref(), Some("Volunteer"));
    }

    #[tokio::test]
    async fn primary_fetch_failure_fails_domain() {
        let endpoints = Endpoints::new("https://pco.test");
        let person = PersonId::parse("7").unwrap();
        let upstream = FakeUpstream::default().failing("https://pco.test/check-ins/", "Unauthorized");

        let err = aggregate(&upstream, &endpoints, &person, window()).await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized");
    }
}
