use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use fieldmap_core::{
    normalize_and_filter, CarrierSelector, LocationDto, LocationFilter, ViewportBounds,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Query string of `GET /api/locations`.
///
/// Bounds are taken as raw text so malformed numbers surface as the
/// standard error envelope instead of the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub(super) struct LocationsQuery {
    pub carrier: Option<String>,
    pub north: Option<String>,
    pub south: Option<String>,
    pub east: Option<String>,
    pub west: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedData {
    pub deleted: bool,
}

impl LocationsQuery {
    fn into_filter(self) -> Result<LocationFilter, String> {
        let carrier = CarrierSelector::parse(self.carrier.as_deref()).map_err(|e| e.to_string())?;

        let edges = [
            ("north", self.north),
            ("south", self.south),
            ("east", self.east),
            ("west", self.west),
        ];
        let provided = edges
            .iter()
            .filter(|(_, raw)| raw.as_deref().is_some_and(|s| !s.trim().is_empty()))
            .count();

        let bounds = match provided {
            0 => None,
            4 => {
                let [north, south, east, west] = edges.map(|(name, raw)| parse_edge(name, raw));
                Some(
                    ViewportBounds::new(north?, south?, east?, west?)
                        .map_err(|e| e.to_string())?,
                )
            }
            _ => {
                return Err(
                    "viewport bounds require all of north, south, east, and west".to_string(),
                )
            }
        };

        Ok(LocationFilter::new(bounds, carrier))
    }
}

fn parse_edge(name: &str, raw: Option<String>) -> Result<f64, String> {
    let raw = raw.unwrap_or_default();
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("viewport bound {name}='{raw}' is not a number"))
}

pub(super) async fn list_locations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LocationsQuery>,
) -> Result<Json<Vec<LocationDto>>, ApiError> {
    let filter = query
        .into_filter()
        .map_err(|message| ApiError::new(req_id.0.clone(), "validation_error", message))?;

    let records = fieldmap_db::list_raw_records(&state.pool, &state.collection)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &fieldmap_db::DbError::from(e)))?;

    let total = records.len();
    let data: Vec<LocationDto> = normalize_and_filter(&records, &filter)
        .into_iter()
        .map(LocationDto::from)
        .collect();

    tracing::debug!(
        request_id = %req_id.0,
        carrier = %filter.carrier,
        bounded = filter.bounds.is_some(),
        returned = data.len(),
        excluded = total - data.len(),
        "location query served"
    );

    Ok(Json(data))
}

pub(super) async fn delete_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedData>>, ApiError> {
    let deleted = fieldmap_db::delete_record(&state.pool, &state.collection, &id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &fieldmap_db::DbError::from(e)))?;

    if !deleted {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("location '{id}' not found"),
        ));
    }

    tracing::info!(request_id = %req_id.0, location_id = %id, "location deleted");

    Ok(Json(ApiResponse {
        data: DeletedData { deleted: true },
        meta: ResponseMeta::new(req_id.0),
    }))
}
