//! Metrics derived from raw observations: wind chill, UV grade,
//! precipitation type and sky condition labels.

use serde::{Deserialize, Serialize};

/// Wind chill (°C) for `temp` °C and wind speed `wind_speed_ms` m/s.
///
/// Applies the JAG/TI formula when `temp <= 10` and the wind is at least
/// 4.8 km/h, rounded half-up to one decimal. Otherwise returns `temp`.
pub fn wind_chill(temp: f64, wind_speed_ms: f64) -> f64 {
    let v = wind_speed_ms * 3.6;
    if temp <= 10.0 && v >= 4.8 {
        let vp = v.powf(0.16);
        let chill = 13.12 + 0.6215 * temp - 11.37 * vp + 0.3965 * temp * vp;
        return (chill * 10.0 + 0.5).floor() / 10.0;
    }
    temp
}

/// UV index category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UvGrade {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvGrade {
    /// Bucket a UV index. Upper bounds are inclusive.
    pub fn from_index(uv: i64) -> Self {
        match uv {
            i64::MIN..=2 => UvGrade::Low,
            3..=5 => UvGrade::Moderate,
            6..=7 => UvGrade::High,
            8..=10 => UvGrade::VeryHigh,
            _ => UvGrade::Extreme,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UvGrade::Low => "low",
            UvGrade::Moderate => "moderate",
            UvGrade::High => "high",
            UvGrade::VeryHigh => "very-high",
            UvGrade::Extreme => "extreme",
        }
    }
}

/// Precipitation type, from the nowcast `PTY` category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrecipitationType {
    #[default]
    None,
    Rain,
    RainSnow,
    Snow,
    Drizzle,
    DrizzleFlurries,
    Flurries,
}

impl PrecipitationType {
    /// Map a `PTY` code. Unknown codes (including 4, which only appears
    /// in the 3-day forecast) map to `None`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => PrecipitationType::Rain,
            2 => PrecipitationType::RainSnow,
            3 => PrecipitationType::Snow,
            5 => PrecipitationType::Drizzle,
            6 => PrecipitationType::DrizzleFlurries,
            7 => PrecipitationType::Flurries,
            _ => PrecipitationType::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrecipitationType::None => "none",
            PrecipitationType::Rain => "rain",
            PrecipitationType::RainSnow => "rain-snow",
            PrecipitationType::Snow => "snow",
            PrecipitationType::Drizzle => "drizzle",
            PrecipitationType::DrizzleFlurries => "drizzle-flurries",
            PrecipitationType::Flurries => "flurries",
        }
    }
}

/// Cloud cover, from the forecast `SKY` category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SkyState {
    #[default]
    Clear,
    MostlyCloudy,
    Overcast,
}

impl SkyState {
    /// Map a `SKY` forecast value. Unknown values map to `Clear`.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "3" => SkyState::MostlyCloudy,
            "4" => SkyState::Overcast,
            _ => SkyState::Clear,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkyState::Clear => "clear",
            SkyState::MostlyCloudy => "mostly-cloudy",
            SkyState::Overcast => "overcast",
        }
    }
}

/// Sky label shown to the user. Active precipitation replaces cloud cover.
pub fn displayed_sky(sky: SkyState, precipitation: PrecipitationType) -> &'static str {
    if precipitation != PrecipitationType::None {
        precipitation.as_str()
    } else {
        sky.as_str()
    }
}
