//! Lat/lng → KMA forecast grid conversion.
//!
//! The Korea Meteorological Administration indexes its nowcast and
//! short-range forecast products on a 5 km grid laid out with a Lambert
//! Conformal Conic projection. Every weather request needs the `(nx, ny)`
//! cell for the caller's coordinates.

use serde::Serialize;
use std::f64::consts::PI;

// ── Projection constants ────────────────────────────────────────────

/// Earth radius (km).
const EARTH_RADIUS_KM: f64 = 6371.00877;
/// Grid spacing (km).
const GRID_KM: f64 = 5.0;
/// First standard parallel (degrees).
const SLAT1: f64 = 30.0;
/// Second standard parallel (degrees).
const SLAT2: f64 = 60.0;
/// Origin longitude (degrees east).
const OLON: f64 = 126.0;
/// Origin latitude (degrees north).
const OLAT: f64 = 38.0;
/// Grid x of the origin.
const XO: f64 = 43.0;
/// Grid y of the origin.
const YO: f64 = 136.0;

const DEG_TO_RAD: f64 = PI / 180.0;

/// A cell of the KMA weather grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridCell {
    pub nx: i32,
    pub ny: i32,
}

impl GridCell {
    /// Cache key for the assembled weather result of this cell.
    pub fn cache_key(&self) -> String {
        format!("weather_{}_{}", self.nx, self.ny)
    }
}

/// Project `(lat, lng)` in degrees onto the KMA grid.
///
/// Pure and total: out-of-range or non-finite input is not rejected and
/// yields whatever cell the arithmetic produces. Rounding is
/// `floor(x + 0.5)` (half-up), which is what the weather service expects.
pub fn lat_lng_to_grid(lat: f64, lng: f64) -> GridCell {
    let re = EARTH_RADIUS_KM / GRID_KM;
    let slat1 = SLAT1 * DEG_TO_RAD;
    let slat2 = SLAT2 * DEG_TO_RAD;
    let olon = OLON * DEG_TO_RAD;
    let olat = OLAT * DEG_TO_RAD;

    let sn = (PI * 0.25 + slat2 * 0.5).tan() / (PI * 0.25 + slat1 * 0.5).tan();
    let sn = (slat1.cos() / slat2.cos()).ln() / sn.ln();

    let sf = (PI * 0.25 + slat1 * 0.5).tan();
    let sf = sf.powf(sn) * slat1.cos() / sn;

    let ro = (PI * 0.25 + olat * 0.5).tan();
    let ro = re * sf / ro.powf(sn);

    let ra = (PI * 0.25 + lat * DEG_TO_RAD * 0.5).tan();
    let ra = re * sf / ra.powf(sn);

    let mut theta = lng * DEG_TO_RAD - olon;
    if theta > PI {
        theta -= 2.0 * PI;
    }
    if theta < -PI {
        theta += 2.0 * PI;
    }
    theta *= sn;

    GridCell {
        nx: (ra * theta.sin() + XO + 0.5).floor() as i32,
        ny: (ro - ra * theta.cos() + YO + 0.5).floor() as i32,
    }
}
