//! Airdash - backend for the Korean air-quality and weather dashboard
//!
//! Proxies the data.go.kr open APIs (AirKorea, KMA) behind a small JSON API
//! with a shared TTL cache, and derives the values the front-end shows.

pub mod api;
pub mod basetime;
pub mod cache;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod derived;
pub mod geodata;
pub mod grid;
pub mod region;
pub mod upstream;
pub mod weather;

pub use cache::TtlCache;
pub use config::{Config, ConfigError};
pub use dashboard::{Dashboard, DashboardError};
pub use geodata::GeoStore;
pub use grid::{lat_lng_to_grid, GridCell};
pub use region::nearest_region;
pub use upstream::{DataPortal, DataPortalClient, UpstreamError};
pub use weather::WeatherResult;
