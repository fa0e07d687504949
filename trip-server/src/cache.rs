//! Caching layer for plan responses.
//!
//! A summary search fans out to several plan variants, and paging or
//! a reloaded page repeats recent searches almost verbatim. Caching
//! keeps that fan-out from hammering the routing endpoint.
//!
//! Time bucketing (5-minute buckets) bounds cache cardinality while
//! ensuring reasonable freshness. Errors are never cached, so a
//! failed variant is retried on the next search.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{Plan, ServiceTimeRange};
use crate::otp::{OtpError, PlanFetcher};
use crate::params::{PlanParams, PlanVariant};

/// Cache key for plan queries.
///
/// Coordinates and speeds are formatted to fixed precision so the key
/// is `Eq + Hash` despite the underlying floats. The time bucket is
/// epoch minutes divided by the bucket size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PlanKey {
    variant: &'static str,
    from: String,
    to: String,
    via: String,
    time_bucket: i64,
    arrive_by: bool,
    modes: String,
    settings: String,
}

impl PlanKey {
    fn new(variant: PlanVariant, params: &PlanParams, bucket_mins: u16) -> Self {
        let time_bucket = params.time_ms / 60_000 / i64::from(bucket_mins.max(1));

        let via = params
            .intermediate_places
            .iter()
            .map(|place| format!("{:.5},{:.5}", place.lat, place.lon))
            .collect::<Vec<_>>()
            .join(";");

        let modes = params
            .modes_for(variant)
            .iter()
            .map(|mode| mode.to_string())
            .collect::<Vec<_>>()
            .join(",");

        // Everything else that changes the endpoint's answer
        let settings = format!(
            "{}|{:.2}|{:.2}|{:.1}|{}|{}|{}|{}|{}|{:.1}|{}|{}|{}",
            params.wheelchair,
            params.walk_speed,
            params.bike_speed,
            params.walk_reluctance,
            params.walk_board_cost,
            params.min_transfer_time,
            params.transfer_penalty,
            params.optimize.as_str(),
            params.ticket_types.as_deref().unwrap_or(""),
            params.itinerary_filtering,
            params.heuristic_disabled_for(variant),
            params.locale,
            params.num_itineraries,
        );

        Self {
            variant: variant.as_str(),
            from: format!("{:.5},{:.5}", params.from.lat, params.from.lon),
            to: format!("{:.5},{:.5}", params.to.lat, params.to.lon),
            via,
            time_bucket,
            arrive_by: params.arrive_by,
            modes,
            settings,
        }
    }
}

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached plans.
    pub ttl: Duration,

    /// TTL for the cached service time range. The range moves once a
    /// day, so this can be much longer than the plan TTL.
    pub time_range_ttl: Duration,

    /// Maximum number of cached plans.
    pub max_capacity: u64,

    /// Time bucket size in minutes.
    pub bucket_mins: u16,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            time_range_ttl: Duration::from_secs(600),
            max_capacity: 1000,
            bucket_mins: 5,
        }
    }
}

/// Cache for plan responses and the service time range.
struct PlanCache {
    plans: MokaCache<PlanKey, Arc<Plan>>,
    time_range: MokaCache<(), ServiceTimeRange>,
    bucket_mins: u16,
}

impl PlanCache {
    fn new(config: &CacheConfig) -> Self {
        let plans = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        let time_range = MokaCache::builder()
            .time_to_live(config.time_range_ttl)
            .max_capacity(1)
            .build();

        Self {
            plans,
            time_range,
            bucket_mins: config.bucket_mins,
        }
    }
}

/// Plan fetcher with caching.
///
/// Wraps any [`PlanFetcher`] and caches successful responses.
pub struct CachedOtpClient<F> {
    client: F,
    cache: PlanCache,
}

impl<F: PlanFetcher> CachedOtpClient<F> {
    /// Create a new cached client.
    pub fn new(client: F, cache_config: &CacheConfig) -> Self {
        Self {
            client,
            cache: PlanCache::new(cache_config),
        }
    }

    /// Access the underlying client for operations that bypass cache.
    pub fn client(&self) -> &F {
        &self.client
    }

    /// Number of cached plans (for monitoring).
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.plans.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.cache.plans.invalidate_all();
        self.cache.time_range.invalidate_all();
    }
}

impl<F: PlanFetcher> PlanFetcher for CachedOtpClient<F> {
    async fn fetch_plan(
        &self,
        variant: PlanVariant,
        params: &PlanParams,
    ) -> Result<Plan, OtpError> {
        let key = PlanKey::new(variant, params, self.cache.bucket_mins);

        if let Some(cached) = self.cache.plans.get(&key).await {
            return Ok((*cached).clone());
        }

        let plan = self.client.fetch_plan(variant, params).await?;

        self.cache.plans.insert(key, Arc::new(plan.clone())).await;

        Ok(plan)
    }

    async fn fetch_service_time_range(&self) -> Result<ServiceTimeRange, OtpError> {
        if let Some(cached) = self.cache.time_range.get(&()).await {
            return Ok(cached);
        }

        let range = self.client.fetch_service_time_range().await?;

        self.cache.time_range.insert((), range).await;

        Ok(range)
    }
}
