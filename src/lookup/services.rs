//! Services domain: team rosters and scheduling history.
//!
//! Assignments are folded into one record per team, every currently rostered
//! team is added even when it has no assignments in the window, and each team
//! is then enriched with its display name and service type.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use futures::future;
use serde::Serialize;
use tracing::debug;

use crate::constants::labels::DEFAULT_POSITION;
use crate::constants::limits::RECENT_PLANS_PER_TEAM;
use crate::error::Result;
use crate::lookup::enrich::best_effort;
use crate::lookup::window::DateRange;
use crate::planning_center::types::{
    PlanPersonAttributes, Resource, ServiceTypeAttributes, TeamAttributes,
};
use crate::planning_center::{fetch_collection, fetch_record, Endpoints, Fetch};
use crate::types::PersonId;

/// A team the person is currently rostered on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTeam {
    /// Team identifier
    pub id: String,
    /// Team name from the roster listing
    pub name: Option<String>,
}

/// One scheduled plan on a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    /// Plan date (creation time when the plan has no date)
    pub date: DateTime<Utc>,
    /// Position label
    pub position: String,
    /// Upstream assignment status
    pub status: Option<String>,
}

/// Scheduling history on one team
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamScheduling {
    /// Distinct positions held
    pub positions: BTreeSet<String>,
    /// Assignments in the window
    pub count: usize,
    /// Earliest assignment in the window
    pub first_scheduled: Option<DateTime<Utc>>,
    /// Latest assignment in the window
    pub last_scheduled: Option<DateTime<Utc>>,
    /// Team display name, when it could be resolved
    pub team_name: Option<String>,
    /// Service type display name, when it could be resolved
    pub service_type: Option<String>,
    /// Most recent assignments, newest first
    pub recent_plans: Vec<PlanEntry>,
}

impl TeamScheduling {
    fn record(&mut self, entry: PlanEntry) {
        self.positions.insert(entry.position.clone());
        self.count += 1;
        self.first_scheduled = Some(self.first_scheduled.map_or(entry.date, |d| d.min(entry.date)));
        self.last_scheduled = Some(self.last_scheduled.map_or(entry.date, |d| d.max(entry.date)));
        self.recent_plans.push(entry);
    }

    fn trim_recent(&mut self) {
        self.recent_plans.sort_by(|a, b| b.date.cmp(&a.date));
        self.recent_plans.truncate(RECENT_PLANS_PER_TEAM);
    }
}

/// Services domain summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesSummary {
    /// Teams the person is on today
    pub current_teams: Vec<CurrentTeam>,
    /// Scheduling history keyed by team identifier
    pub scheduling_by_team: BTreeMap<String, TeamScheduling>,
    /// Window the assignments were read over
    pub date_range: DateRange,
}

impl ServicesSummary {
    /// Teams with scheduling history that the person is no longer on
    pub fn past_team_ids(&self) -> Vec<&str> {
        self.scheduling_by_team
            .keys()
            .map(String::as_str)
            .filter(|id| !self.current_teams.iter().any(|t| t.id == *id))
            .collect()
    }
}

#[derive(Debug, Default)]
struct TeamNames {
    team: Option<String>,
    service_type: Option<String>,
}

/// Build the services summary for `person`
pub async fn aggregate<F>(
    fetcher: &F,
    endpoints: &Endpoints,
    person: &PersonId,
    window: DateRange,
) -> Result<ServicesSummary>
where
    F: Fetch + ?Sized,
{
    let teams: Vec<Resource<TeamAttributes>> =
        fetch_collection(fetcher, &endpoints.person_teams(person)).await?;
    let assignments: Vec<Resource<PlanPersonAttributes>> =
        fetch_collection(fetcher, &endpoints.plan_people(person, window.cutoff())).await?;

    let mut scheduling_by_team = fold_assignments(&assignments, &window);
    for team in &teams {
        scheduling_by_team.entry(team.id.clone()).or_default();
    }

    let team_ids: Vec<String> = scheduling_by_team.keys().cloned().collect();
    let names = future::join_all(
        team_ids.iter().map(|id| resolve_team(fetcher, endpoints, id)),
    )
    .await;

    for (id, names) in team_ids.iter().zip(names) {
        if let Some(scheduling) = scheduling_by_team.get_mut(id) {
            scheduling.team_name = names.team;
            scheduling.service_type = names.service_type;
            scheduling.trim_recent();
        }
    }

    debug!(
        person = %person,
        teams = teams.len(),
        assignments = assignments.len(),
        scheduled_teams = scheduling_by_team.len(),
        "Services aggregated"
    );

    Ok(ServicesSummary {
        current_teams: teams
            .into_iter()
            .map(|t| CurrentTeam { id: t.id, name: t.attributes.name })
            .collect(),
        scheduling_by_team,
        date_range: window,
    })
}

/// Fold windowed assignments into per-team records.
///
/// Assignments without a team or without any date cannot be placed and are
/// skipped.
fn fold_assignments(
    assignments: &[Resource<PlanPersonAttributes>],
    window: &DateRange,
) -> BTreeMap<String, TeamScheduling> {
    assignments
        .iter()
        .filter_map(|assignment| {
            let team_id = assignment.relationships.id_of("team")?;
            let date = assignment.attributes.scheduled_at()?;
            window.admits(date).then(|| {
                let entry = PlanEntry {
                    date,
                    position: assignment.attributes.position_label(DEFAULT_POSITION).to_string(),
                    status: assignment.attributes.status.clone(),
                };
                (team_id, entry)
            })
        })
        .fold(BTreeMap::new(), |mut by_team, (team_id, entry)| {
            by_team
                .entry(team_id.to_string())
                .or_insert_with(TeamScheduling::default)
                .record(entry);
            by_team
        })
}

async fn resolve_team<F>(fetcher: &F, endpoints: &Endpoints, team_id: &str) -> TeamNames
where
    F: Fetch + ?Sized,
{
    let url = endpoints.team(team_id);
    let Some(team) = best_effort(
        "team",
        team_id,
        fetch_record::<TeamAttributes, _>(fetcher, &url),
    )
    .await
    else {
        return TeamNames::default();
    };

    let service_type = match team.relationships.id_of("service_type") {
        Some(service_type_id) => {
            let url = endpoints.service_type(service_type_id);
            best_effort(
                "service_type",
                service_type_id,
                fetch_record::<ServiceTypeAttributes, _>(fetcher, &url),
            )
            .await
            .and_then(|st| st.attributes.name)
        }
        None => None,
    };

    TeamNames { team: team.attributes.name, service_type }
}
