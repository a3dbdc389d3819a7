//! reqwest-backed [`DataPortal`] for apis.data.go.kr.

use super::{
    items_at, open_envelope, typed_items_at, DataPortal, ForecastItem, NowcastItem,
    UpstreamError, UpstreamResult, UvItem,
};
use crate::basetime::BaseStamp;
use crate::config::UpstreamConfig;
use crate::grid::GridCell;
use serde_json::Value;

/// Client for the AirKorea, KMA and living-weather-index gateways.
#[derive(Debug, Clone)]
pub struct DataPortalClient {
    client: reqwest::Client,
    service_key: String,
    endpoints: UpstreamConfig,
}

impl DataPortalClient {
    /// Create a client. `service_key` is the *decoded* data.go.kr key;
    /// it is URL-encoded on every request.
    pub fn new(service_key: impl Into<String>, endpoints: UpstreamConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            service_key: service_key.into(),
            endpoints,
        }
    }

    /// GET `url` with the service key plus `params` and return the
    /// envelope body.
    async fn get_body(&self, url: &str, params: &[(&str, String)]) -> UpstreamResult<Value> {
        log::debug!("GET {}", url);
        let text = self
            .client
            .get(url)
            .query(&[("serviceKey", self.service_key.as_str())])
            .query(params)
            .send()
            .await?
            .text()
            .await?;
        open_envelope(&text)
    }

    async fn kma_items<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        base: &BaseStamp,
        cell: GridCell,
    ) -> UpstreamResult<Vec<T>> {
        let url = format!("{}/{}", self.endpoints.weather_base, operation);
        let body = self
            .get_body(
                &url,
                &[
                    ("dataType", "JSON".to_string()),
                    ("numOfRows", "60".to_string()),
                    ("pageNo", "1".to_string()),
                    ("base_date", base.date.clone()),
                    ("base_time", base.time.clone()),
                    ("nx", cell.nx.to_string()),
                    ("ny", cell.ny.to_string()),
                ],
            )
            .await?;
        typed_items_at(&body, "/items/item")
    }
}

impl DataPortal for DataPortalClient {
    async fn realtime_measurements(&self, sido: &str) -> UpstreamResult<Vec<Value>> {
        let url = format!(
            "{}/getCtprvnRltmMesureDnsty",
            self.endpoints.air_quality_base
        );
        let body = self
            .get_body(
                &url,
                &[
                    ("returnType", "json".to_string()),
                    ("numOfRows", "200".to_string()),
                    ("pageNo", "1".to_string()),
                    ("sidoName", sido.to_string()),
                    ("ver", "1.3".to_string()),
                ],
            )
            .await?;
        Ok(items_at(&body, "/items"))
    }

    async fn station_list(&self, addr: &str) -> UpstreamResult<Vec<Value>> {
        let url = format!("{}/getMsrstnList", self.endpoints.station_base);
        let body = self
            .get_body(
                &url,
                &[
                    ("returnType", "json".to_string()),
                    ("numOfRows", "500".to_string()),
                    ("pageNo", "1".to_string()),
                    ("addr", addr.to_string()),
                ],
            )
            .await?;
        Ok(items_at(&body, "/items"))
    }

    async fn nowcast(&self, base: &BaseStamp, cell: GridCell) -> UpstreamResult<Vec<NowcastItem>> {
        self.kma_items("getUltraSrtNcst", base, cell).await
    }

    async fn forecast(
        &self,
        base: &BaseStamp,
        cell: GridCell,
    ) -> UpstreamResult<Vec<ForecastItem>> {
        self.kma_items("getUltraSrtFcst", base, cell).await
    }

    async fn uv_index(&self, area_no: &str, time: &str) -> UpstreamResult<Vec<UvItem>> {
        let url = format!("{}/getUVIdxV4", self.endpoints.living_index_base);
        let body = self
            .get_body(
                &url,
                &[
                    ("dataType", "JSON".to_string()),
                    ("numOfRows", "10".to_string()),
                    ("pageNo", "1".to_string()),
                    ("areaNo", area_no.to_string()),
                    ("time", time.to_string()),
                ],
            )
            .await?;
        typed_items_at(&body, "/items/item")
    }

    async fn map_topology(&self) -> UpstreamResult<String> {
        let response = self.client.get(&self.endpoints.geodata_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::HttpStatus(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
