//! In-memory [`DataPortal`] for tests.

use super::{DataPortal, ForecastItem, NowcastItem, UpstreamError, UpstreamResult, UvItem};
use crate::basetime::BaseStamp;
use crate::grid::GridCell;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// How a mocked call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Envelope with a non-`"00"` result code.
    Status,
    /// Transport-level failure (connection, 5xx, unparsable body).
    Transport,
}

impl Failure {
    fn into_error(self) -> UpstreamError {
        match self {
            Failure::Status => UpstreamError::Status {
                code: "30".to_string(),
                message: "SERVICE KEY IS NOT REGISTERED ERROR.".to_string(),
            },
            Failure::Transport => UpstreamError::HttpStatus(502),
        }
    }
}

type Reply<T> = Result<T, Failure>;

pub struct MockPortal {
    pub realtime: Mutex<HashMap<String, Reply<Vec<Value>>>>,
    pub stations: Mutex<HashMap<String, Reply<Vec<Value>>>>,
    pub nowcast: Mutex<Reply<Vec<NowcastItem>>>,
    pub forecast: Mutex<Reply<Vec<ForecastItem>>>,
    pub uv: Mutex<Reply<Vec<UvItem>>>,
    pub topology: Mutex<Reply<String>>,
    /// Every call, as `"<operation>:<argument>"`.
    pub calls: Mutex<Vec<String>>,
}

impl Default for MockPortal {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPortal {
    pub fn new() -> Self {
        Self {
            realtime: Mutex::new(HashMap::new()),
            stations: Mutex::new(HashMap::new()),
            nowcast: Mutex::new(Ok(Vec::new())),
            forecast: Mutex::new(Ok(Vec::new())),
            uv: Mutex::new(Ok(Vec::new())),
            topology: Mutex::new(Ok(r#"{"type":"Topology","objects":{}}"#.to_string())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_realtime(self, sido: &str, reply: Reply<Vec<Value>>) -> Self {
        self.realtime.lock().unwrap().insert(sido.to_string(), reply);
        self
    }

    pub fn with_stations(self, addr: &str, reply: Reply<Vec<Value>>) -> Self {
        self.stations.lock().unwrap().insert(addr.to_string(), reply);
        self
    }

    pub fn with_nowcast(self, reply: Reply<Vec<NowcastItem>>) -> Self {
        *self.nowcast.lock().unwrap() = reply;
        self
    }

    pub fn with_forecast(self, reply: Reply<Vec<ForecastItem>>) -> Self {
        *self.forecast.lock().unwrap() = reply;
        self
    }

    pub fn with_uv(self, reply: Reply<Vec<UvItem>>) -> Self {
        *self.uv.lock().unwrap() = reply;
        self
    }

    pub fn with_topology(self, reply: Reply<String>) -> Self {
        *self.topology.lock().unwrap() = reply;
        self
    }

    /// Number of recorded calls whose label starts with `prefix`.
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, label: String) {
        self.calls.lock().unwrap().push(label);
    }
}

pub fn nowcast_item(category: &str, value: &str) -> NowcastItem {
    NowcastItem {
        category: category.to_string(),
        obsr_value: value.to_string(),
    }
}

pub fn forecast_item(category: &str, value: &str) -> ForecastItem {
    ForecastItem {
        category: category.to_string(),
        fcst_value: value.to_string(),
        fcst_date: String::new(),
        fcst_time: String::new(),
    }
}

impl DataPortal for MockPortal {
    async fn realtime_measurements(&self, sido: &str) -> UpstreamResult<Vec<Value>> {
        self.record(format!("realtime:{sido}"));
        let reply = self.realtime.lock().unwrap().get(sido).cloned();
        reply.unwrap_or(Ok(Vec::new())).map_err(Failure::into_error)
    }

    async fn station_list(&self, addr: &str) -> UpstreamResult<Vec<Value>> {
        self.record(format!("stations:{addr}"));
        let reply = self.stations.lock().unwrap().get(addr).cloned();
        reply.unwrap_or(Ok(Vec::new())).map_err(Failure::into_error)
    }

    async fn nowcast(&self, base: &BaseStamp, cell: GridCell) -> UpstreamResult<Vec<NowcastItem>> {
        self.record(format!("nowcast:{}{}:{}_{}", base.date, base.time, cell.nx, cell.ny));
        self.nowcast.lock().unwrap().clone().map_err(Failure::into_error)
    }

    async fn forecast(&self, base: &BaseStamp, cell: GridCell) -> UpstreamResult<Vec<ForecastItem>> {
        self.record(format!("forecast:{}{}:{}_{}", base.date, base.time, cell.nx, cell.ny));
        self.forecast.lock().unwrap().clone().map_err(Failure::into_error)
    }

    async fn uv_index(&self, area_no: &str, time: &str) -> UpstreamResult<Vec<UvItem>> {
        self.record(format!("uv:{area_no}:{time}"));
        self.uv.lock().unwrap().clone().map_err(Failure::into_error)
    }

    async fn map_topology(&self) -> UpstreamResult<String> {
        self.record("topology:".to_string());
        self.topology.lock().unwrap().clone().map_err(Failure::into_error)
    }
}
