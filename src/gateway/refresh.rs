//! Cache-miss recovery.
//!
//! Each cached entity kind that can be fetched directly implements
//! [`Refreshable`]. Callers look in the cache first and hand the result to
//! [`cached_or_refetch`], which only goes to the network on a miss.

use crate::error::GatewayError;
use crate::metrics;
use async_trait::async_trait;
use std::fmt::Debug;
use tracing::debug;

/// An entity that can be fetched again when the cache lacks it.
#[async_trait]
pub trait Refreshable: Sized + Send {
    /// Key used for the direct fetch.
    type Id: Copy + Debug + Send + Sync;
    /// Whatever performs the fetch (an HTTP client in production).
    type Source: ?Sized + Sync;
    /// Metric and log label.
    const KIND: &'static str;

    async fn refetch(source: &Self::Source, id: Self::Id) -> Result<Self, GatewayError>;
}

/// Return `cached` if present, otherwise fetch `id` from `source`.
pub async fn cached_or_refetch<T: Refreshable>(
    cached: Option<T>,
    source: &T::Source,
    id: T::Id,
) -> Result<T, GatewayError> {
    if let Some(value) = cached {
        return Ok(value);
    }

    metrics::record_cache_miss(T::KIND);
    debug!(entity = T::KIND, id = ?id, "Cache miss, fetching directly");
    T::refetch(source, id).await
}
