//! Groups domain: memberships split by whether the group is archived.
//!
//! Not windowed; every membership the person has is reported.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use futures::future;
use serde::Serialize;

use crate::constants::labels::{DEFAULT_ROLE, UNKNOWN_GROUP};
use crate::error::Result;
use crate::lookup::enrich::best_effort;
use crate::planning_center::types::{GroupAttributes, MembershipAttributes, Resource};
use crate::planning_center::{fetch_collection, fetch_record, Endpoints, Fetch};
use crate::types::PersonId;

/// One group membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembership {
    /// Group display name
    pub name: String,
    /// Role in the group
    pub role: String,
    /// When the person joined
    pub joined: Option<DateTime<Utc>>,
    /// When the group was archived; `None` while it is live
    pub removed: Option<DateTime<Utc>>,
}

/// Groups domain summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupsSummary {
    /// Memberships in live (or unresolved) groups
    pub active: Vec<GroupMembership>,
    /// Memberships in archived groups
    pub removed: Vec<GroupMembership>,
}

/// Build the groups summary for `person`
pub async fn aggregate<F>(fetcher: &F, endpoints: &Endpoints, person: &PersonId) -> Result<GroupsSummary>
where
    F: Fetch + ?Sized,
{
    let memberships: Vec<Resource<MembershipAttributes>> =
        fetch_collection(fetcher, &endpoints.memberships(person)).await?;

    let group_ids: BTreeSet<&str> = memberships
        .iter()
        .filter_map(|m| m.relationships.id_of("group"))
        .collect();

    let resolved = future::join_all(group_ids.iter().map(|&id| async move {
        let url = endpoints.group(id);
        let group = best_effort("group", id, fetch_record::<GroupAttributes, _>(fetcher, &url)).await;
        group.map(|g| (id, g.attributes))
    }))
    .await;
    let groups: HashMap<&str, GroupAttributes> = resolved.into_iter().flatten().collect();

    let (active, removed): (Vec<_>, Vec<_>) = memberships
        .iter()
        .map(|membership| {
            let group = membership
                .relationships
                .id_of("group")
                .and_then(|id| groups.get(id));
            GroupMembership {
                name: group
                    .and_then(|g| g.name.clone())
                    .unwrap_or_else(|| UNKNOWN_GROUP.to_string()),
                role: membership.attributes.role_or(DEFAULT_ROLE).to_string(),
                joined: membership.attributes.joined_at,
                removed: group.and_then(|g| g.archived_at),
            }
        })
        .partition(|m| m.removed.is_none());

    Ok(GroupsSummary { active, removed })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::planning_center::testing::FakeUpstream;
    use serde_json::{json, Value};

    fn membership(id: &str, group: &str, role: Option<&str>) -> Value {
        json!({
            "type": "Membership",
            "id": id,
            "attributes": {"role": role, "joined_at": "2022-09-01T00:00:00Z"},
            "relationships": {"group": {"data": {"type": "Group", "id": group}}}
        })
    }

    #[tokio::test]
    async fn partitions_on_archival() {
        let endpoints = Endpoints::new("https://pco.test");
        let person = PersonId::parse("7").unwrap();
        let upstream = FakeUpstream::default()
            .page(&endpoints.memberships(&person), json!([
                membership("m1", "G1", Some("leader")),
                membership("m2", "G2", None),
                membership("m3", "G3", None),
            ]))
            .record(&endpoints.group("G1"), json!({"id": "G1", "attributes": {"name": "Men's Bible Study", "archived_at": null}}))
            .record(&endpoints.group("G2"), json!({"id": "G2", "attributes": {"name": "Alpha 2023", "archived_at": "2023-12-01T00:00:00Z"}}))
            .failing(&endpoints.group("G3"), "Internal Server Error");

        let summary = aggregate(&upstream, &endpoints, &person).await.unwrap();

        let active: Vec<_> = summary.active.iter().map(|g| (g.name.as_str(), g.role.as_str())).collect();
        assert_eq!(active, [("Men's Bible Study", "leader"), (UNKNOWN_GROUP, DEFAULT_ROLE)]);
        assert_eq!(summary.removed.len(), 1);
        assert_eq!(summary.removed[0].name, "Alpha 2023");
        assert!(summary.removed[0].removed.is_some());
        assert!(summary.active.iter().all(|g| g.removed.is_none()));
    }

    #[tokio::test]
    async fn malformed_membership_does_not_fail_domain() {
        let endpoints = Endpoints::new("https://pco.test");
        let person = PersonId::parse("7").unwrap();
        let mut bad = membership("m2", "G2", None);
        bad["attributes"]["role"] = json!(3);
        let upstream = FakeUpstream::default()
            .page(&endpoints.memberships(&person), json!([membership("m1", "G1", Some("member")), bad]))
            .record(&endpoints.group("G1"), json!({"id": "G1", "attributes": {"name": "Young Adults"}}));

        let summary = aggregate(&upstream, &endpoints, &person).await.unwrap();
        assert_eq!(summary.active.len(), 1);
        assert_eq!(summary.active[0].name, "Young Adults");
        assert!(summary.removed.is_empty());
        // The skipped membership's group is never looked up
        assert!(!upstream.calls().contains(&endpoints.group("G2")));
    }

    #[tokio::test]
    async fn looks_up_each_group_once() {
        let endpoints = Endpoints::new("https://pco.test");
        let person = PersonId::parse("7").unwrap();
        let upstream = FakeUpstream::default()
            .page(&endpoints.memberships(&person), json!([
                membership("m1", "G1", None),
                membership("m2", "G1", Some("leader")),
            ]))
            .record(&endpoints.group("G1"), json!({"id": "G1", "attributes": {"name": "Choir"}}));

        let summary = aggregate(&upstream, &endpoints, &person).await.unwrap();
        assert_eq!(summary.active.len(), 2);
        let group_calls = upstream.calls().iter().filter(|u| u.ends_with("/groups/G1")).count();
        assert_eq!(group_calls, 1);
    }

    #[tokio::test]
    async fn primary_fetch_failure_fails_domain() {
        let endpoints = Endpoints::new("https://pco.test");
        let person = PersonId::parse("7").unwrap();
        let upstream = FakeUpstream::default().failing(&endpoints.memberships(&person), "Forbidden");

        assert!(aggregate(&upstream, &endpoints, &person).await.is_err());
    }
}
