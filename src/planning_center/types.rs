//! Planning Center data types.
//!
//! These types represent the JSON:API envelopes and per-resource attribute
//! shapes returned by the Planning Center API. Every response is decoded into
//! one of these at the fetch boundary; nothing downstream indexes raw JSON.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result, GENERIC_UPSTREAM_MESSAGE};

/// One page of a collection response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    /// Resource array (or a single object for member endpoints)
    #[serde(default)]
    pub data: Option<Value>,
    /// Pagination links
    #[serde(default)]
    pub links: Option<Links>,
}

impl Page {
    /// Link to the following page, if the upstream sent a usable one
    pub fn next_link(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|l| l.next.as_deref())
            .filter(|next| !next.is_empty())
    }

    /// Resources carried by this page, in response order
    pub fn into_items(self) -> Vec<Value> {
        match self.data {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(single) => vec![single],
        }
    }
}

/// Pagination links block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    /// Absolute URL of the next page
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDocument {
    #[serde(default)]
    errors: Vec<ErrorObject>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorObject {
    #[serde(default)]
    detail: Option<String>,
}

/// Extract `errors[0].detail` from an error response body.
///
/// Falls back to the generic upstream message when the body is not JSON,
/// has no errors, or the first error carries no detail.
pub fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorDocument>(body)
        .ok()
        .and_then(|doc| doc.errors.into_iter().next())
        .and_then(|e| e.detail)
        .filter(|detail| !detail.trim().is_empty())
        .unwrap_or_else(|| GENERIC_UPSTREAM_MESSAGE.to_string())
}

/// A single JSON:API resource object with typed attributes
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub struct Resource<A> {
    /// Resource identifier
    pub id: String,
    /// Resource type name, e.g. `"Team"`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Typed attributes
    #[serde(default)]
    pub attributes: A,
    /// Links to related resources
    #[serde(default)]
    pub relationships: Relationships,
}

impl<A: DeserializeOwned + Default> Resource<A> {
    /// Decode one resource object
    pub fn decode(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            Error::parse(format!(
                "Invalid {} resource: {e}",
                std::any::type_name::<A>()
                    .rsplit("::")
                    .next()
                    .map_or("upstream", |name| name.trim_end_matches("Attributes"))
            ))
        })
    }

    /// Decode a list of resource objects.
    ///
    /// Resources that do not match `A` are logged and left out; the rest of
    /// the list is kept.
    pub fn decode_all(values: Vec<Value>) -> Vec<Self> {
        values
            .into_iter()
            .filter_map(|value| {
                let id = value.get("id").and_then(Value::as_str).unwrap_or("unknown").to_string();
                match Self::decode(value) {
                    Ok(resource) => Some(resource),
                    Err(e) => {
                        warn!(id = %id, error = %e, "Skipping undecodable resource");
                        None
                    }
                }
            })
            .collect()
    }
}

/// Relationship map of a resource, keyed by relationship name
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Relationships(HashMap<String, Relationship>);

impl Relationships {
    /// Identifier of a to-one relationship, if linked
    pub fn id_of(&self, name: &str) -> Option<&str> {
        match self.0.get(name)?.data.as_ref()? {
            Linkage::One(identifier) => Some(identifier.id.as_str()),
            Linkage::Many(_) => None,
        }
    }
}

/// One named relationship
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Relationship {
    /// Resource linkage; `None` when the relationship is empty
    #[serde(default)]
    pub data: Option<Linkage>,
}

/// Resource linkage of a relationship
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    /// To-one linkage
    One(Identifier),
    /// To-many linkage
    Many(Vec<Identifier>),
}

/// Resource identifier object
#[derive(Debug, Clone, Deserialize)]
pub struct Identifier {
    /// Resource type name
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Resource identifier
    pub id: String,
}

/// Parse an upstream timestamp.
///
/// Accepts RFC 3339 and bare `YYYY-MM-DD` dates (read as midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
            Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
        })
}

/// Lenient timestamp field: anything that is not a parsable string is absent.
fn timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// `Person` attributes (People API)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonAttributes {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Given name
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default)]
    pub last_name: Option<String>,
    /// Profile creation time
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PersonAttributes {
    /// Best display name: `name`, else first and last name joined
    pub fn display_name(&self) -> String {
        if let Some(name) = non_empty(self.name.as_ref()) {
            return name.to_string();
        }
        [self.first_name.as_ref(), self.last_name.as_ref()]
            .into_iter()
            .filter_map(non_empty)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `Team` attributes (Services API)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamAttributes {
    /// Team name
    #[serde(default)]
    pub name: Option<String>,
}

/// `ServiceType` attributes (Services API)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceTypeAttributes {
    /// Service type name, e.g. "Sunday Morning"
    #[serde(default)]
    pub name: Option<String>,
}

/// `PlanPerson` attributes: one scheduling assignment (Services API)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanPersonAttributes {
    /// Assignment status as reported upstream
    #[serde(default)]
    pub status: Option<String>,
    /// Position on the team
    #[serde(default)]
    pub team_position_name: Option<String>,
    /// Date of the plan the assignment belongs to
    #[serde(default, deserialize_with = "timestamp")]
    pub sort_date: Option<DateTime<Utc>>,
    /// When the assignment was created
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PlanPersonAttributes {
    /// Plan date, falling back to the assignment's creation time
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        self.sort_date.or(self.created_at)
    }

    /// Position name, else status, else `fallback`
    pub fn position_label<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_empty(self.team_position_name.as_ref())
            .or_else(|| non_empty(self.status.as_ref()))
            .unwrap_or(fallback)
    }
}

/// `CheckIn` attributes (Check-Ins API)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckInAttributes {
    /// Check-in kind, e.g. "Regular", "Guest", "Volunteer"
    #[serde(default)]
    pub kind: Option<String>,
    /// Check-in time
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// `Event` attributes (Check-Ins API)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckInEventAttributes {
    /// Event name
    #[serde(default)]
    pub name: Option<String>,
}

/// `EventInstance` attributes of a registration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInstanceAttributes {
    /// Name of the registered event
    #[serde(default, alias = "event_name")]
    pub name: Option<String>,
    /// Instance start
    #[serde(default, deserialize_with = "timestamp")]
    pub starts_at: Option<DateTime<Utc>>,
    /// Instance end
    #[serde(default, deserialize_with = "timestamp")]
    pub ends_at: Option<DateTime<Utc>>,
    /// Whether the instance spans whole days
    #[serde(default)]
    pub all_day_event: Option<bool>,
}

/// `Membership` attributes (Groups API)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipAttributes {
    /// Role in the group, e.g. "leader"
    #[serde(default)]
    pub role: Option<String>,
    /// When the person joined
    #[serde(default, deserialize_with = "timestamp")]
    pub joined_at: Option<DateTime<Utc>>,
}

impl MembershipAttributes {
    /// Role, else `fallback`
    pub fn role_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_empty(self.role.as_ref()).unwrap_or(fallback)
    }
}

/// `Group` attributes (Groups API)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupAttributes {
    /// Group name
    #[serde(default)]
    pub name: Option<String>,
    /// When the group was archived; `None` for live groups
    #[serde(default, deserialize_with = "timestamp")]
    pub archived_at: Option<DateTime<Utc>>,
}
