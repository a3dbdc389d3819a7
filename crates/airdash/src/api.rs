//! HTTP surface of the dashboard.
//!
//! JSON endpoints under `/api`, a health check, and the front-end's static
//! files for everything else.

use crate::dashboard::{Dashboard, DashboardError};
use crate::upstream::{DataPortal, UpstreamError};
use crate::weather::WeatherResult;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Error reply: a status code and a `{"error": "..."}` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            // Gateway result messages are shown to the user verbatim
            DashboardError::Upstream(UpstreamError::Status { message, .. }) => {
                Self::internal(message)
            }
            DashboardError::Upstream(e) => Self::internal(e.to_string()),
            DashboardError::Geo(_) => Self::internal("map data unavailable"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Query params for the bulk endpoint
#[derive(Debug, Deserialize)]
pub struct BulkQuery {
    /// Comma-separated region names
    pub sido: Option<String>,
}

/// Query params for the weather endpoint
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/// Split `a, b,,c` into `["a", "b", "c"]`.
fn parse_region_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// GET /api/realtime/{sido}
async fn realtime<U: DataPortal>(
    State(dash): State<Arc<Dashboard<U>>>,
    Path(sido): Path<String>,
) -> ApiResult<Json<Value>> {
    Ok(Json(dash.realtime(&sido).await?))
}

/// GET /api/realtime-bulk?sido=a,b
async fn realtime_bulk<U: DataPortal>(
    State(dash): State<Arc<Dashboard<U>>>,
    Query(query): Query<BulkQuery>,
) -> ApiResult<Json<Map<String, Value>>> {
    let regions = parse_region_list(query.sido.as_deref());
    if regions.is_empty() {
        return Err(ApiError::bad_request("sido parameter required"));
    }
    Ok(Json(dash.realtime_bulk(&regions).await))
}

/// GET /api/geodata
async fn geodata<U: DataPortal>(State(dash): State<Arc<Dashboard<U>>>) -> ApiResult<Response> {
    let text = dash.geodata().await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], text).into_response())
}

/// GET /api/station-list/{sido}
async fn station_list<U: DataPortal>(
    State(dash): State<Arc<Dashboard<U>>>,
    Path(sido): Path<String>,
) -> Json<Value> {
    Json(dash.station_list(&sido).await)
}

/// GET /api/weather?lat=..&lng=..
async fn weather<U: DataPortal>(
    State(dash): State<Arc<Dashboard<U>>>,
    Query(query): Query<WeatherQuery>,
) -> ApiResult<Json<WeatherResult>> {
    let (Some(lat), Some(lng)) = (
        parse_coordinate(query.lat.as_deref()),
        parse_coordinate(query.lng.as_deref()),
    ) else {
        return Err(ApiError::bad_request("lat, lng parameters required"));
    };

    Ok(Json(dash.weather(lat, lng).await?))
}

/// GET /health - Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// Build the application router.
///
/// When `static_dir` is set, paths that match no route are served from it.
pub fn router<U: DataPortal>(
    dash: Arc<Dashboard<U>>,
    static_dir: Option<&std::path::Path>,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/realtime/{sido}", get(realtime::<U>))
        .route("/api/realtime-bulk", get(realtime_bulk::<U>))
        .route("/api/geodata", get(geodata::<U>))
        .route("/api/station-list/{sido}", get(station_list::<U>))
        .route("/api/weather", get(weather::<U>))
        .with_state(dash);

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(cors)
}

/// Serve `app` on `addr` until `shutdown` resolves.
pub async fn serve(
    app: Router,
    addr: &str,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Dashboard listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    log::info!("Server shut down gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{TtlCache, DEFAULT_TTL};
    use crate::geodata::GeoStore;
    use crate::upstream::mock::{Failure, MockPortal};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn test_parse_region_list() {
        assert_eq!(
            parse_region_list(Some("서울, 부산,,제주 ")),
            vec!["서울", "부산", "제주"]
        );
        assert!(parse_region_list(Some(" , ")).is_empty());
        assert!(parse_region_list(None).is_empty());
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate(Some("37.5665")), Some(37.5665));
        assert_eq!(parse_coordinate(Some(" 126.978 ")), Some(126.978));
        assert_eq!(parse_coordinate(Some("abc")), None);
        assert_eq!(parse_coordinate(Some("")), None);
        assert_eq!(parse_coordinate(Some("NaN")), None);
        assert_eq!(parse_coordinate(Some("inf")), None);
        assert_eq!(parse_coordinate(None), None);
    }

    #[test]
    fn test_status_error_carries_upstream_message() {
        let err: ApiError = DashboardError::Upstream(UpstreamError::Status {
            code: "22".into(),
            message: "LIMITED NUMBER OF SERVICE REQUESTS EXCEEDS ERROR.".into(),
        })
        .into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.message,
            "LIMITED NUMBER OF SERVICE REQUESTS EXCEEDS ERROR."
        );
    }

    #[test]
    fn test_transport_error_is_internal() {
        let err: ApiError = DashboardError::Upstream(UpstreamError::HttpStatus(503)).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("503"));
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn app(portal: MockPortal, dir: &tempfile::TempDir) -> Router {
        let dash = Dashboard::new(
            portal,
            TtlCache::new(DEFAULT_TTL),
            GeoStore::new(dir.path().join("geo.json")),
        );
        router(Arc::new(dash), None)
    }

    #[tokio::test]
    async fn test_realtime_status_error_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let portal = MockPortal::new().with_realtime("서울", Err(Failure::Status));

        let (status, body) = fetch(app(portal, &dir), "/api/realtime/%EC%84%9C%EC%9A%B8").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "SERVICE KEY IS NOT REGISTERED ERROR.");
    }

    #[tokio::test]
    async fn test_bulk_requires_regions() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = fetch(app(MockPortal::new(), &dir), "/api/realtime-bulk").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "sido parameter required");

        let (status, _) = fetch(app(MockPortal::new(), &dir), "/api/realtime-bulk?sido=,").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_weather_rejects_bad_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        for uri in [
            "/api/weather",
            "/api/weather?lat=37.5",
            "/api/weather?lat=abc&lng=127",
            "/api/weather?lat=NaN&lng=127",
        ] {
            let (status, body) = fetch(app(MockPortal::new(), &dir), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"], "lat, lng parameters required");
        }
    }

    #[tokio::test]
    async fn test_geodata_failure_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let portal = MockPortal::new().with_topology(Err(Failure::Transport));

        let (status, body) = fetch(app(portal, &dir), "/api/geodata").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "map data unavailable");
    }
}
