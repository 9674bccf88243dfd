use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::constants::pagination::PER_PAGE;
use crate::error::{Error, Result};
use crate::planning_center::types::{upstream_error_message, Page, Resource};

/// Source of upstream JSON documents.
///
/// `PlanningCenterClient` is the production implementation; aggregators only
/// see this trait so they can run against any upstream.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// GET one document.
    ///
    /// Fails with a `PlanningCenter` error on a non-success status and a
    /// `Network` error when the request itself fails.
    async fn fetch_resource(&self, url: &str) -> Result<Value>;

    /// GET every page of a collection and concatenate the resources in order.
    ///
    /// Always starts from the first page. Any failing page aborts the whole
    /// collection.
    async fn fetch_all_pages(&self, base_url: &str) -> Result<Vec<Value>> {
        let mut all = Vec::new();
        let mut pages = 0_usize;
        let mut next = Some(paged_url(base_url));

        while let Some(url) = next {
            let body = self.fetch_resource(&url).await?;
            let page: Page = serde_json::from_value(body)
                .map_err(|e| Error::parse(format!("Invalid page from {url}: {e}")))?;
            pages += 1;
            next = page.next_link().map(str::to_string);
            all.extend(page.into_items());
        }

        debug!(url = base_url, pages, resources = all.len(), "Fetched collection");
        Ok(all)
    }
}

/// Append the fixed page size to a collection URL
pub fn paged_url(base_url: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}per_page={PER_PAGE}")
}

/// Fetch one member resource and decode its `data` object
pub async fn fetch_record<A, F>(fetcher: &F, url: &str) -> Result<Resource<A>>
where
    A: DeserializeOwned + Default,
    F: Fetch + ?Sized,
{
    let mut body = fetcher.fetch_resource(url).await?;
    match body.get_mut("data").map(Value::take) {
        Some(data) if data.is_object() => Resource::decode(data),
        _ => Err(Error::parse(format!("Missing 'data' object in response from {url}"))),
    }
}

/// Fetch every page of a collection and decode each resource.
///
/// A failing page or malformed page envelope fails the collection; single
/// resources that do not decode are skipped.
pub async fn fetch_collection<A, F>(fetcher: &F, url: &str) -> Result<Vec<Resource<A>>>
where
    A: DeserializeOwned + Default,
    F: Fetch + ?Sized,
{
    Ok(Resource::decode_all(fetcher.fetch_all_pages(url).await?))
}

/// Client for accessing Planning Center Online API
///
/// The Basic credential is encoded once at construction and reused for every
/// request. Clone is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct PlanningCenterClient {
    client: Client,
    authorization: String,
    api_base: String,
}

impl PlanningCenterClient {
    /// Create a new Planning Center client from config
    pub fn new(config: &Config) -> Result<Self> {
        config.require_credentials()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            authorization: basic_credential(&config.pco_app_id, &config.pco_secret),
            api_base: config.api_base.clone(),
        })
    }

    /// Fetch one arbitrary upstream document on behalf of a caller.
    ///
    /// Only URLs under the configured API origin are forwarded.
    pub async fn proxy(&self, url: &str) -> Result<Value> {
        if !self.is_upstream_url(url) {
            return Err(Error::InvalidInput("Invalid or missing URL".to_string()));
        }
        self.fetch_resource(url).await
    }

    fn is_upstream_url(&self, url: &str) -> bool {
        url.strip_prefix(self.api_base.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

#[async_trait]
impl Fetch for PlanningCenterClient {
    async fn fetch_resource(&self, url: &str) -> Result<Value> {
        debug!(url, "GET");
        let resp = self.client
            .get(url)
            .header(AUTHORIZATION, self.authorization.as_str())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request to {url} failed: {e}")))?;

        let status = resp.status();
        let body = resp.text().await
            .map_err(|e| Error::Network(format!("Reading response from {url} failed: {e}")))?;

        if !status.is_success() {
            debug!(url, status = status.as_u16(), "Upstream returned an error");
            return Err(Error::pco_status(upstream_error_message(&body), status.as_u16()));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::parse(format!("Invalid JSON from {url}: {e}")))
    }
}

/// `Basic` authorization header value for an app id / secret pair
fn basic_credential(app_id: &str, secret: &str) -> String {
    format!("Basic {}", base64::encode(format!("{app_id}:{secret}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::planning_center::testing::FakeUpstream;
    use crate::planning_center::types::TeamAttributes;
    use serde_json::json;

    fn client_for(base: &str) -> PlanningCenterClient {
        let config = Config::from_lookup(|key| match key {
            "PCO_APP_ID" => Some("app".to_string()),
            "PCO_SECRET" => Some("secret".to_string()),
            "PCO_API_BASE" => Some(base.to_string()),
            _ => None,
        })
        .unwrap();
        PlanningCenterClient::new(&config).unwrap()
    }

    #[test]
    fn credential_is_base64_of_id_and_secret() {
        assert_eq!(basic_credential("app", "secret"), "Basic YXBwOnNlY3JldA==");
    }

    #[test]
    fn paged_url_picks_separator() {
        assert_eq!(paged_url("https://x.test/a"), "https://x.test/a?per_page=100");
        assert_eq!(paged_url("https://x.test/a?order=-sort_date"), "https://x.test/a?order=-sort_date&per_page=100");
    }

    #[test]
    fn client_requires_credentials() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert!(matches!(PlanningCenterClient::new(&config), Err(Error::Config { .. })));
    }

    #[test]
    fn proxy_only_accepts_upstream_urls() {
        let client = client_for("https://api.planningcenteronline.com");
        assert!(client.is_upstream_url("https://api.planningcenteronline.com/people/v2/people/1"));
        assert!(!client.is_upstream_url("https://api.planningcenteronline.com.evil.test/people"));
        assert!(!client.is_upstream_url("http://api.planningcenteronline.com/people"));
        assert!(!client.is_upstream_url(""));
    }

    #[tokio::test]
    async fn proxy_rejects_before_sending() {
        let client = client_for("https://api.planningcenteronline.com");
        let err = client.proxy("https://example.com/people").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid or missing URL");
    }

    #[tokio::test]
    async fn follows_next_links_until_exhausted() {
        let base = "https://x.test/teams";
        let upstream = FakeUpstream::default()
            .with(&paged_url(base), json!({
                "data": [{"id": "1"}, {"id": "2"}],
                "links": {"next": "https://x.test/teams?offset=2"}
            }))
            .with("https://x.test/teams?offset=2", json!({
                "data": [{"id": "3"}, {"id": "4"}],
                "links": {"next": "https://x.test/teams?offset=4"}
            }))
            .with("https://x.test/teams?offset=4", json!({
                "data": [{"id": "5"}],
                "links": {}
            }));

        let items = upstream.fetch_all_pages(base).await.unwrap();
        let ids: Vec<_> = items.iter().map(|v| v["id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5"]);
        assert_eq!(upstream.calls().len(), 3);

        // A second call starts over from the first page
        let again = upstream.fetch_all_pages(base).await.unwrap();
        assert_eq!(again.len(), 5);
        assert_eq!(upstream.calls()[3], paged_url(base));
    }

    #[tokio::test]
    async fn failing_page_aborts_collection() {
        let base = "https://x.test/teams";
        let upstream = FakeUpstream::default()
            .with(&paged_url(base), json!({
                "data": [{"id": "1"}],
                "links": {"next": "https://x.test/teams?offset=1"}
            }))
            .failing("https://x.test/teams?offset=1", "Rate limit exceeded");

        let err = upstream.fetch_all_pages(base).await.unwrap_err();
        assert_eq!(err.to_string(), "Rate limit exceeded");
    }

    #[tokio::test]
    async fn record_requires_data_object() {
        let upstream = FakeUpstream::default()
            .with("https://x.test/teams/1", json!({"data": {"id": "1", "attributes": {"name": "Band"}}}))
            .with("https://x.test/teams/2", json!({"data": []}));

        let team: Resource<TeamAttributes> = fetch_record(&upstream, "https://x.test/teams/1").await.unwrap();
        assert_eq!(team.attributes.name.as_deref(), Some("Band"));

        let err = fetch_record::<TeamAttributes, _>(&upstream, "https://x.test/teams/2").await.unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
