//! Current-conditions assembly from the KMA nowcast, forecast and UV APIs.

use crate::basetime::BaseTimes;
use crate::derived::{displayed_sky, wind_chill, PrecipitationType, SkyState, UvGrade};
use crate::grid::GridCell;
use crate::region::{nearest_region, uv_area_code};
use crate::upstream::{DataPortal, ForecastItem, NowcastItem, UpstreamError, UvItem};
use serde::{Deserialize, Serialize};

/// Current weather at one grid cell, as sent to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResult {
    /// Air temperature (°C), `T1H`
    pub temperature: Option<f64>,
    /// Relative humidity (%), `REH`
    pub humidity: Option<i64>,
    /// Wind speed (m/s), `WSD`
    pub wind_speed: Option<f64>,
    /// Wind direction (degrees), `VEC`
    pub wind_direction: Option<i64>,
    /// One-hour precipitation, `RN1`, passed through verbatim
    pub precipitation: String,
    pub precipitation_type: PrecipitationType,
    /// Sky label after the precipitation override
    pub sky: String,
    pub wind_chill: Option<f64>,
    pub uv_index: Option<i64>,
    pub uv_grade: Option<UvGrade>,
    /// Nowcast base time, `HH:MM`
    pub base_time: String,
}

impl WeatherResult {
    /// A result with nothing observed yet.
    pub fn empty(base_time: impl Into<String>) -> Self {
        Self {
            temperature: None,
            humidity: None,
            wind_speed: None,
            wind_direction: None,
            precipitation: "0".to_string(),
            precipitation_type: PrecipitationType::None,
            sky: SkyState::Clear.as_str().to_string(),
            wind_chill: None,
            uv_index: None,
            uv_grade: None,
            base_time: base_time.into(),
        }
    }

    /// Copy the nowcast categories this dashboard shows into the result.
    pub fn apply_nowcast(&mut self, items: &[NowcastItem]) {
        for item in items {
            let value = item.obsr_value.as_str();
            match item.category.as_str() {
                "T1H" => self.temperature = parse_float(value),
                "RN1" => self.precipitation = value.to_string(),
                "REH" => self.humidity = parse_int_prefix(value),
                "PTY" => {
                    self.precipitation_type = parse_int_prefix(value)
                        .map(PrecipitationType::from_code)
                        .unwrap_or_default()
                }
                "WSD" => self.wind_speed = parse_float(value),
                "VEC" => self.wind_direction = parse_int_prefix(value),
                _ => {}
            }
        }
    }

    /// Fill the fields derived from what was observed: displayed sky and
    /// wind chill.
    pub fn finish(&mut self, sky: SkyState) {
        self.sky = displayed_sky(sky, self.precipitation_type).to_string();
        if let (Some(temp), Some(speed)) = (self.temperature, self.wind_speed) {
            self.wind_chill = Some(wind_chill(temp, speed));
        }
    }
}

/// Sky state from the first `SKY` forecast value, `Clear` if none.
pub fn sky_from_forecast(items: &[ForecastItem]) -> SkyState {
    items
        .iter()
        .find(|item| item.category == "SKY")
        .map(|item| SkyState::from_code(&item.fcst_value))
        .unwrap_or_default()
}

/// A UV index with its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UvReading {
    pub index: i64,
    pub grade: UvGrade,
}

/// UV reading from the first row: current hour, else three hours ahead.
pub fn uv_from_items(items: &[UvItem]) -> Option<UvReading> {
    let first = items.first()?;
    let raw = [first.h0.as_deref(), first.h3.as_deref()]
        .into_iter()
        .flatten()
        .find(|v| !v.is_empty())
        .unwrap_or("0");
    let index = parse_int_prefix(raw)?;
    Some(UvReading {
        index,
        grade: UvGrade::from_index(index),
    })
}

/// Outcome of a lookup that must never fail its caller.
#[derive(Debug, Clone, PartialEq)]
pub struct BestEffort<T> {
    pub value: Option<T>,
    pub warning: Option<String>,
}

impl<T> BestEffort<T> {
    fn found(value: Option<T>) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    fn failed(warning: String) -> Self {
        Self {
            value: None,
            warning: Some(warning),
        }
    }
}

/// UV index for the region nearest to `(lat, lng)`.
///
/// Regions without an area code are skipped silently; upstream failures
/// become a warning and leave the value empty.
pub async fn lookup_uv<U: DataPortal>(
    upstream: &U,
    lat: f64,
    lng: f64,
    uv_time: &str,
) -> BestEffort<UvReading> {
    let region = nearest_region(lat, lng);
    let Some(area_no) = uv_area_code(region) else {
        return BestEffort::found(None);
    };

    match upstream.uv_index(area_no, uv_time).await {
        Ok(items) => BestEffort::found(uv_from_items(&items)),
        Err(e) => {
            let warning = format!("UV index lookup failed for {}: {}", region, e);
            log::warn!("{}", warning);
            BestEffort::failed(warning)
        }
    }
}

/// An assembled result plus the non-fatal problems met along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub result: WeatherResult,
    pub warnings: Vec<String>,
}

/// Query nowcast, forecast and UV for one location and assemble the result.
///
/// A non-`"00"` nowcast or forecast envelope leaves the corresponding fields
/// at their defaults. Any other nowcast/forecast failure fails the whole
/// lookup. The UV lookup never fails it.
pub async fn assemble<U: DataPortal>(
    upstream: &U,
    lat: f64,
    lng: f64,
    cell: GridCell,
    times: &BaseTimes,
) -> Result<WeatherReport, UpstreamError> {
    let mut result = WeatherResult::empty(times.display_time());
    let mut warnings = Vec::new();

    let nowcast = upstream.nowcast(&times.nowcast, cell).await;
    if let Some(items) = tolerate_status(nowcast, "nowcast", &mut warnings)? {
        result.apply_nowcast(&items);
    }

    let forecast = upstream.forecast(&times.forecast, cell).await;
    let sky = tolerate_status(forecast, "forecast", &mut warnings)?
        .map(|items| sky_from_forecast(&items))
        .unwrap_or_default();

    result.finish(sky);

    let uv = lookup_uv(upstream, lat, lng, &times.uv_time).await;
    if let Some(reading) = uv.value {
        result.uv_index = Some(reading.index);
        result.uv_grade = Some(reading.grade);
    }
    warnings.extend(uv.warning);

    Ok(WeatherReport { result, warnings })
}

/// Turn an envelope status error into a warning; propagate everything else.
fn tolerate_status<T>(
    outcome: Result<T, UpstreamError>,
    what: &str,
    warnings: &mut Vec<String>,
) -> Result<Option<T>, UpstreamError> {
    match outcome {
        Ok(value) => Ok(Some(value)),
        Err(e @ UpstreamError::Status { .. }) => {
            let warning = format!("{} unavailable: {}", what, e);
            log::warn!("{}", warning);
            warnings.push(warning);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Leading integer of `s`, ignoring trailing junk (`"270.5"` → 270).
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let digits_start = usize::from(s.starts_with(|c: char| c == '-' || c == '+'));
    let digits_len = s[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    s[..digits_start + digits_len].parse().ok()
}

fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
