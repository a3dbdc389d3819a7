//! KST base date/time selection for the KMA and living-weather APIs.
//!
//! Ultra-short nowcasts are issued on the hour and published 40 minutes
//! later; ultra-short forecasts are issued at half past and published 45
//! minutes after the hour. Asking for a base time that is not yet published
//! returns no data, so before the cut-off we step back one hour.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Timelike, Utc};

const KST_OFFSET_SECS: i32 = 9 * 3600;
const NOWCAST_READY_MINUTE: u32 = 40;
const FORECAST_READY_MINUTE: u32 = 45;

/// A `base_date` / `base_time` pair as the KMA API expects them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseStamp {
    /// `YYYYMMDD`
    pub date: String,
    /// `HHMM`
    pub time: String,
}

/// All request timestamps needed for one weather lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseTimes {
    pub nowcast: BaseStamp,
    pub forecast: BaseStamp,
    /// `YYYYMMDDHH` for the UV index request.
    pub uv_time: String,
}

impl BaseTimes {
    /// Base times for a request made at `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        let kst = to_kst(now);
        let hour_start = truncate_to_hour(kst);

        let nowcast_base = step_back_before(hour_start, kst.minute(), NOWCAST_READY_MINUTE);
        let forecast_base = step_back_before(hour_start, kst.minute(), FORECAST_READY_MINUTE);

        Self {
            nowcast: BaseStamp {
                date: nowcast_base.format("%Y%m%d").to_string(),
                time: nowcast_base.format("%H00").to_string(),
            },
            forecast: BaseStamp {
                date: forecast_base.format("%Y%m%d").to_string(),
                time: forecast_base.format("%H30").to_string(),
            },
            uv_time: kst.format("%Y%m%d%H").to_string(),
        }
    }

    /// Nowcast base time as `HH:MM`, for display.
    pub fn display_time(&self) -> String {
        let t = &self.nowcast.time;
        format!("{}:{}", &t[..2], &t[2..])
    }
}

fn to_kst(now: DateTime<Utc>) -> NaiveDateTime {
    match FixedOffset::east_opt(KST_OFFSET_SECS) {
        Some(kst) => now.with_timezone(&kst).naive_local(),
        None => now.naive_utc() + Duration::seconds(i64::from(KST_OFFSET_SECS)),
    }
}

fn truncate_to_hour(t: NaiveDateTime) -> NaiveDateTime {
    t.date()
        .and_hms_opt(t.hour(), 0, 0)
        .unwrap_or(t)
}

fn step_back_before(hour_start: NaiveDateTime, minute: u32, ready: u32) -> NaiveDateTime {
    if minute < ready {
        hour_start - Duration::hours(1)
    } else {
        hour_start
    }
}
