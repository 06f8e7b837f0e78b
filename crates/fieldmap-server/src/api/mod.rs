mod locations;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use fieldmap_core::CollectionName;
use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub collection: CollectionName,
    pub map_provider_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct ClientConfigData {
    map_provider_key: Option<String>,
    has_map_provider_key: bool,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// One aggregate failure per request when the backing store cannot answer.
pub(super) fn map_db_error(request_id: String, error: &fieldmap_db::DbError) -> ApiError {
    tracing::error!(request_id = %request_id, error = %error, "database query failed");
    ApiError::new(
        request_id,
        "service_unavailable",
        "location store is unavailable",
    )
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn api_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/locations", get(locations::list_locations))
        .route("/api/locations/{id}", delete(locations::delete_location))
        .route("/api/config", get(client_config))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(api_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match fieldmap_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

async fn client_config(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ClientConfigData>> {
    Json(ApiResponse {
        data: ClientConfigData {
            has_map_provider_key: state.map_provider_key.is_some(),
            map_provider_key: state.map_provider_key,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state(pool: PgPool, map_provider_key: Option<&str>) -> AppState {
        AppState {
            pool,
            collection: CollectionName::parse("cea_lea").expect("collection"),
            map_provider_key: map_provider_key.map(str::to_string),
        }
    }

    async fn seed(pool: &PgPool, document: Value) -> i64 {
        let collection = CollectionName::parse("cea_lea").expect("collection");
        fieldmap_db::insert_record(pool, &collection, &document)
            .await
            .expect("insert record")
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: Value = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_service_unavailable_maps_to_503() {
        let response =
            ApiError::new("req-1", "service_unavailable", "store down").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn api_error_unknown_code_maps_to_500() {
        let response = ApiError::new("req-1", "mystery", "?").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_reports_ok_with_live_database(pool: PgPool) {
        let app = build_app(test_state(pool, None), default_rate_limit_state());
        let (status, json) = get_json(app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"], json!({ "status": "ok", "database": "ok" }));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn config_reports_missing_key(pool: PgPool) {
        let app = build_app(test_state(pool, None), default_rate_limit_state());
        let (status, json) = get_json(app, "/api/config").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["data"],
            json!({ "mapProviderKey": null, "hasMapProviderKey": false })
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn config_exposes_configured_key(pool: PgPool) {
        let app = build_app(test_state(pool, Some("maps-key")), default_rate_limit_state());
        let (_, json) = get_json(app, "/api/config").await;
        assert_eq!(json["data"]["mapProviderKey"], "maps-key");
        assert_eq!(json["data"]["hasMapProviderKey"], true);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn locations_are_normalized_classified_and_filtered(pool: PgPool) {
        seed(
            &pool,
            json!({
                "CCT": "CCT-001",
                "SERVICE": "Fiber",
                "CUSR_NAME": "Dialog Axiata PLC",
                "BENDADDRESS": "Colombo 03",
                "CIRT_STATUS": "Active",
                "CEA Node- latitude": "6.9271",
                "CEA Node- longitude": 79.8612
            }),
        )
        .await;
        seed(
            &pool,
            json!({
                "CCT": "CCT-002",
                "CUSR_NAME": "Unknown Telecom",
                "latitude": "N/A",
                "longitude": "N/A"
            }),
        )
        .await;
        seed(
            &pool,
            json!({
                "CCT": "CCT-003",
                "CUSR_NAME": "Mobitel (Pvt) Ltd",
                "CEA Node - latitude": 9.66,
                "CEA Node - longitude": 80.02
            }),
        )
        .await;

        let app = build_app(test_state(pool, None), default_rate_limit_state());

        let (status, json) = get_json(app.clone(), "/api/locations").await;
        assert_eq!(status, StatusCode::OK);
        let all = json.as_array().expect("bare array");
        assert_eq!(all.len(), 2, "N/A record must be excluded");
        assert_eq!(all[0]["cct"], "CCT-001");
        assert_eq!(all[0]["carrier"], "Dialog");
        assert_eq!(
            all[0]["nodeCoordinates"],
            json!({ "latitude": 6.9271, "longitude": 79.8612 })
        );
        assert_eq!(all[0]["leafCoordinates"], Value::Null);
        assert_eq!(all[1]["carrier"], "Mobitel");

        let (_, json) = get_json(
            app.clone(),
            "/api/locations?north=7&south=6&east=80&west=79",
        )
        .await;
        let ids: Vec<&str> = json
            .as_array()
            .expect("bare array")
            .iter()
            .filter_map(|l| l["cct"].as_str())
            .collect();
        assert_eq!(ids, ["CCT-001"]);

        let (_, json) = get_json(app, "/api/locations?carrier=mobitel").await;
        let ids: Vec<&str> = json
            .as_array()
            .expect("bare array")
            .iter()
            .filter_map(|l| l["cct"].as_str())
            .collect();
        assert_eq!(ids, ["CCT-003"]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn partial_bounds_are_rejected(pool: PgPool) {
        let app = build_app(test_state(pool, None), default_rate_limit_state());
        let (status, json) = get_json(app, "/api/locations?north=7&south=6").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn unknown_carrier_is_rejected(pool: PgPool) {
        let app = build_app(test_state(pool, None), default_rate_limit_state());
        let (status, json) = get_json(app, "/api/locations?carrier=Airtel").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn missing_collection_table_yields_503(pool: PgPool) {
        let state = AppState {
            pool,
            collection: CollectionName::parse("does_not_exist").expect("collection"),
            map_provider_key: None,
        };
        let app = build_app(state, default_rate_limit_state());
        let (status, json) = get_json(app, "/api/locations").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "service_unavailable");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn delete_removes_record_then_reports_not_found(pool: PgPool) {
        let id = seed(&pool, json!({ "CCT": "CCT-009", "latitude": 6.0, "longitude": 80.0 })).await;
        let app = build_app(test_state(pool, None), default_rate_limit_state());

        let request = || {
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/locations/{id}"))
                .body(Body::empty())
                .expect("request")
        };

        let response = app.clone().oneshot(request()).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["deleted"], true);

        let response = app.clone().oneshot(request()).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let (_, json) = get_json(app, "/api/locations").await;
        assert_eq!(json, json!([]));
    }
}
