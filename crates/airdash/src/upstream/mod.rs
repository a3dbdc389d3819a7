//! Boundary between the dashboard and the data.go.kr gateways.
//!
//! The dashboard calls [`DataPortal`] instead of a concrete HTTP client,
//! which keeps the cache and weather assembly testable with a mock.

mod client;
#[cfg(test)]
pub mod mock;

pub use client::DataPortalClient;

use crate::basetime::BaseStamp;
use crate::grid::GridCell;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::future::Future;

/// Errors from upstream calls.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The envelope came back with a result code other than `"00"`.
    #[error("API error (code {code}): {message}")]
    Status { code: String, message: String },

    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Result code the gateways use for success.
const RESULT_OK: &str = "00";

// ── Wire types ──────────────────────────────────────────────────────

/// One observation from the ultra-short nowcast (`getUltraSrtNcst`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowcastItem {
    pub category: String,
    #[serde(deserialize_with = "string_or_number")]
    pub obsr_value: String,
}

/// One value from the ultra-short forecast (`getUltraSrtFcst`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastItem {
    pub category: String,
    #[serde(deserialize_with = "string_or_number")]
    pub fcst_value: String,
    #[serde(default)]
    pub fcst_date: String,
    #[serde(default)]
    pub fcst_time: String,
}

/// One row from the UV index API. `h0` is the current hour, `h3` three
/// hours ahead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UvItem {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub h0: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub h3: Option<String>,
}

/// KMA documents values as strings but a few gateways emit bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    response: Option<EnvelopeResponse>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeResponse {
    #[serde(default)]
    header: Option<EnvelopeHeader>,
    #[serde(default)]
    body: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeHeader {
    #[serde(default)]
    result_code: String,
    #[serde(default)]
    result_msg: String,
}

/// Parse a gateway response and return its body.
///
/// Fails with [`UpstreamError::Status`] unless the header carries `"00"`.
pub(crate) fn open_envelope(text: &str) -> UpstreamResult<Value> {
    let envelope: Envelope = serde_json::from_str(text)?;
    let response = envelope.response.unwrap_or(EnvelopeResponse {
        header: None,
        body: None,
    });

    match response.header {
        Some(header) if header.result_code == RESULT_OK => {
            Ok(response.body.unwrap_or(Value::Null))
        }
        Some(header) => Err(UpstreamError::Status {
            message: if header.result_msg.is_empty() {
                "API error".to_string()
            } else {
                header.result_msg
            },
            code: header.result_code,
        }),
        None => Err(UpstreamError::Status {
            code: String::new(),
            message: "API error".to_string(),
        }),
    }
}

/// The array at `pointer` inside `body`, or an empty list when the body has
/// no items (the gateways send `""` or omit the field for empty pages).
pub(crate) fn items_at(body: &Value, pointer: &str) -> Vec<Value> {
    match body.pointer(pointer) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// Typed variant of [`items_at`].
pub(crate) fn typed_items_at<T: serde::de::DeserializeOwned>(
    body: &Value,
    pointer: &str,
) -> UpstreamResult<Vec<T>> {
    Ok(serde_json::from_value(Value::Array(items_at(body, pointer)))?)
}

// ── Seam ────────────────────────────────────────────────────────────

/// The upstream open-data gateways.
pub trait DataPortal: Send + Sync + 'static {
    /// Realtime air-quality measurements for every station in a region.
    fn realtime_measurements(
        &self,
        sido: &str,
    ) -> impl Future<Output = UpstreamResult<Vec<Value>>> + Send;

    /// Measuring stations whose address matches `addr`.
    fn station_list(&self, addr: &str)
        -> impl Future<Output = UpstreamResult<Vec<Value>>> + Send;

    /// Ultra-short nowcast observations for a grid cell.
    fn nowcast(
        &self,
        base: &BaseStamp,
        cell: GridCell,
    ) -> impl Future<Output = UpstreamResult<Vec<NowcastItem>>> + Send;

    /// Ultra-short forecast values for a grid cell.
    fn forecast(
        &self,
        base: &BaseStamp,
        cell: GridCell,
    ) -> impl Future<Output = UpstreamResult<Vec<ForecastItem>>> + Send;

    /// UV index rows for an area code at `time` (`YYYYMMDDHH`).
    fn uv_index(
        &self,
        area_no: &str,
        time: &str,
    ) -> impl Future<Output = UpstreamResult<Vec<UvItem>>> + Send;

    /// Raw administrative-boundary TopoJSON.
    fn map_topology(&self) -> impl Future<Output = UpstreamResult<String>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_envelope_ok() {
        let text = r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL_CODE"},
            "body":{"items":[{"stationName":"중구","pm10Value":"31"}],"totalCount":1}}}"#;
        let body = open_envelope(text).unwrap();
        let items = items_at(&body, "/items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["stationName"], "중구");
    }

    #[test]
    fn test_open_envelope_status_error() {
        let text = r#"{"response":{"header":{"resultCode":"30","resultMsg":"SERVICE KEY IS NOT REGISTERED ERROR."}}}"#;
        match open_envelope(text).unwrap_err() {
            UpstreamError::Status { code, message } => {
                assert_eq!(code, "30");
                assert_eq!(message, "SERVICE KEY IS NOT REGISTERED ERROR.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_open_envelope_missing_header() {
        let err = open_envelope(r#"{"unexpected":true}"#).unwrap_err();
        assert!(matches!(err, UpstreamError::Status { .. }));
        assert_eq!(err.to_string(), "API error (code ): API error");
    }

    #[test]
    fn test_open_envelope_xml_is_parse_error() {
        let text = "<OpenAPI_ServiceResponse><cmmMsgHeader/></OpenAPI_ServiceResponse>";
        assert!(matches!(
            open_envelope(text).unwrap_err(),
            UpstreamError::Parse(_)
        ));
    }

    #[test]
    fn test_kma_items_nested_under_item() {
        let text = r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL_SERVICE"},
            "body":{"dataType":"JSON","items":{"item":[
                {"baseDate":"20250314","baseTime":"1000","category":"T1H","nx":60,"ny":127,"obsrValue":"12.3"},
                {"baseDate":"20250314","baseTime":"1000","category":"REH","nx":60,"ny":127,"obsrValue":55}
            ]}}}}"#;
        let body = open_envelope(text).unwrap();
        let items: Vec<NowcastItem> = typed_items_at(&body, "/items/item").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].obsr_value, "12.3");
        assert_eq!(items[1].obsr_value, "55");
    }

    #[test]
    fn test_empty_items_string() {
        let text = r#"{"response":{"header":{"resultCode":"00","resultMsg":"OK"},"body":{"items":""}}}"#;
        let body = open_envelope(text).unwrap();
        let items: Vec<ForecastItem> = typed_items_at(&body, "/items/item").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_uv_item_optional_fields() {
        let item: UvItem = serde_json::from_str(r#"{"code":"A07","areaNo":"1100000000","h0":"3"}"#).unwrap();
        assert_eq!(item.h0.as_deref(), Some("3"));
        assert!(item.h3.is_none());
    }
}
