use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::dto::{ChargerDto, ListChargersParams};
use crate::interfaces::http::common::{ApiResponse, ApiResult};
use crate::interfaces::http::router::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/chargers",
    tag = "Chargers",
    params(ListChargersParams),
    responses(
        (status = 200, description = "Chargers, optionally filtered by station", body = ApiResponse<Vec<ChargerDto>>),
        (status = 404, description = "Station not found")
    )
)]
pub async fn list_chargers(
    State(state): State<AppState>,
    Query(params): Query<ListChargersParams>,
) -> ApiResult<Json<ApiResponse<Vec<ChargerDto>>>> {
    let chargers = state.stations.list_chargers(params.station_id).await?;
    Ok(Json(ApiResponse::success(
        chargers.into_iter().map(ChargerDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/chargers/{id}",
    tag = "Chargers",
    params(("id" = u32, Path, description = "Charger ID")),
    responses(
        (status = 200, description = "Charger details", body = ApiResponse<ChargerDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_charger(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<Json<ApiResponse<ChargerDto>>> {
    let charger = state.stations.get_charger(id).await?;
    Ok(Json(ApiResponse::success(charger.into())))
}
