//! Best-effort secondary lookups.

use std::future::Future;

use tracing::warn;

use crate::error::Result;

/// Await an enrichment lookup, turning failure into `None`.
///
/// Every failure is logged; none is propagated to the aggregator.
pub(crate) async fn best_effort<T, Fut>(entity: &'static str, id: &str, lookup: Fut) -> Option<T>
where
    Fut: Future<Output = Result<T>>,
{
    match lookup.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(entity, id, error = %e, "Enrichment lookup failed, continuing without it");
            None
        }
    }
}
