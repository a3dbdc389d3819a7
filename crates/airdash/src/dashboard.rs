//! Endpoint logic: cache lookups, upstream calls and response shaping.
//!
//! Handlers hold an `Arc<Dashboard<U>>`; everything here is independent of
//! HTTP so it can be driven directly in tests.

use crate::basetime::BaseTimes;
use crate::cache::TtlCache;
use crate::geodata::{GeoError, GeoStore};
use crate::grid::lat_lng_to_grid;
use crate::upstream::{DataPortal, UpstreamError};
use crate::weather::{self, WeatherReport, WeatherResult};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde_json::{Map, Value};

/// Errors surfaced to single-resource endpoints.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Geo(#[from] GeoError),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

/// Shared state behind every endpoint.
pub struct Dashboard<U> {
    upstream: U,
    cache: TtlCache<Value>,
    geo: GeoStore,
}

fn realtime_key(sido: &str) -> String {
    format!("sido_{}", sido)
}

fn station_key(sido: &str) -> String {
    format!("stlist_{}", sido)
}

impl<U: DataPortal> Dashboard<U> {
    pub fn new(upstream: U, cache: TtlCache<Value>, geo: GeoStore) -> Self {
        Self {
            upstream,
            cache,
            geo,
        }
    }

    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    /// Realtime measurements for one region.
    pub async fn realtime(&self, sido: &str) -> Result<Value> {
        let key = realtime_key(sido);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        match self.upstream.realtime_measurements(sido).await {
            Ok(items) => {
                let items = Value::Array(items);
                self.cache.set(key, items.clone());
                Ok(items)
            }
            Err(e) => {
                log::error!("Realtime lookup failed [{}]: {}", sido, e);
                Err(e.into())
            }
        }
    }

    /// Realtime measurements for several regions at once.
    ///
    /// Regions are fetched concurrently. A region that fails maps to an
    /// empty list; the batch itself never fails.
    pub async fn realtime_bulk(&self, regions: &[String]) -> Map<String, Value> {
        let lookups = regions.iter().map(|sido| async move {
            let items = match self.realtime(sido).await {
                Ok(items) => items,
                Err(_) => Value::Array(Vec::new()),
            };
            (sido.clone(), items)
        });

        join_all(lookups).await.into_iter().collect()
    }

    /// Measuring stations in a region. Failures yield an empty list.
    pub async fn station_list(&self, sido: &str) -> Value {
        let key = station_key(sido);
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        // The station service matches on address prefix, and the short
        // region name is a valid prefix of every address in that region.
        match self.upstream.station_list(sido).await {
            Ok(items) => {
                let items = Value::Array(items);
                self.cache.set(key, items.clone());
                items
            }
            Err(e) => {
                log::error!("Station list lookup failed [{}]: {}", sido, e);
                Value::Array(Vec::new())
            }
        }
    }

    /// Current weather at `(lat, lng)`.
    pub async fn weather(&self, lat: f64, lng: f64) -> Result<WeatherResult> {
        Ok(self.weather_at(lat, lng, Utc::now()).await?.result)
    }

    /// Current weather at `(lat, lng)` as of `now`.
    ///
    /// Results are cached per grid cell, so nearby coordinates share one
    /// entry. A cache hit carries no warnings.
    pub async fn weather_at(
        &self,
        lat: f64,
        lng: f64,
        now: DateTime<Utc>,
    ) -> Result<WeatherReport> {
        let cell = lat_lng_to_grid(lat, lng);
        let key = cell.cache_key();

        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_value::<WeatherResult>(cached) {
                Ok(result) => {
                    return Ok(WeatherReport {
                        result,
                        warnings: Vec::new(),
                    })
                }
                Err(e) => log::warn!("Discarding malformed cache entry {}: {}", key, e),
            }
        }

        let times = BaseTimes::at(now);
        let report = weather::assemble(&self.upstream, lat, lng, cell, &times)
            .await
            .map_err(|e| {
                log::error!("Weather lookup failed [{}]: {}", key, e);
                e
            })?;

        match serde_json::to_value(&report.result) {
            Ok(value) => self.cache.set(key, value),
            Err(e) => log::warn!("Weather result not cacheable: {}", e),
        }
        Ok(report)
    }

    /// Administrative boundary TopoJSON.
    pub async fn geodata(&self) -> Result<String> {
        self.geo.load_or_fetch(&self.upstream).await.map_err(|e| {
            log::error!("Map data unavailable: {}", e);
            e.into()
        })
    }
}
