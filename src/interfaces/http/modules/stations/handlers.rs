//! Station API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    AddChargerRequest, AvailabilityDto, ConsumptionReportDto, CreateStationRequest, StationDto,
};
use crate::application::Principal;
use crate::interfaces::http::common::{ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::modules::chargers::ChargerDto;
use crate::interfaces::http::router::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/stations",
    tag = "Stations",
    responses((status = 200, description = "All stations", body = ApiResponse<Vec<StationDto>>))
)]
pub async fn list_stations(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<StationDto>>>> {
    let stations = state.stations.list_stations().await?;
    Ok(Json(ApiResponse::success(
        stations.into_iter().map(StationDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/stations",
    tag = "Stations",
    security(("bearer_auth" = [])),
    request_body = CreateStationRequest,
    responses(
        (status = 201, description = "Station created", body = ApiResponse<StationDto>),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Station id already in use")
    )
)]
pub async fn create_station(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(body): ValidatedJson<CreateStationRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<StationDto>>)> {
    let station = state
        .stations
        .create_station(&principal, body.id, &body.name, &body.location)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(station.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{id}",
    tag = "Stations",
    params(("id" = u32, Path, description = "Station ID")),
    responses(
        (status = 200, description = "Station details", body = ApiResponse<StationDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<Json<ApiResponse<StationDto>>> {
    let station = state.stations.get_station(id).await?;
    Ok(Json(ApiResponse::success(station.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/stations/{id}",
    tag = "Stations",
    security(("bearer_auth" = [])),
    params(("id" = u32, Path, description = "Station ID")),
    responses(
        (status = 200, description = "Station and its chargers removed", body = ApiResponse<StationDto>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not found"),
        (status = 409, description = "A charger is in use")
    )
)]
pub async fn delete_station(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<u32>,
) -> ApiResult<Json<ApiResponse<StationDto>>> {
    let station = state.stations.delete_station(&principal, id).await?;
    Ok(Json(ApiResponse::success(station.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{id}/availability",
    tag = "Stations",
    params(("id" = u32, Path, description = "Station ID")),
    responses(
        (status = 200, description = "Charger counts by status", body = ApiResponse<AvailabilityDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn station_availability(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<Json<ApiResponse<AvailabilityDto>>> {
    let availability = state.stations.availability(id).await?;
    Ok(Json(ApiResponse::success(availability.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{id}/consumption",
    tag = "Stations",
    security(("bearer_auth" = [])),
    params(("id" = u32, Path, description = "Station ID")),
    responses(
        (status = 200, description = "Energy and revenue totals", body = ApiResponse<ConsumptionReportDto>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not found")
    )
)]
pub async fn station_consumption(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<u32>,
) -> ApiResult<Json<ApiResponse<ConsumptionReportDto>>> {
    let report = state.stations.consumption_report(&principal, id).await?;
    Ok(Json(ApiResponse::success(report.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/stations/{id}/chargers",
    tag = "Stations",
    security(("bearer_auth" = [])),
    params(("id" = u32, Path, description = "Station ID")),
    request_body = AddChargerRequest,
    responses(
        (status = 201, description = "Charger attached", body = ApiResponse<ChargerDto>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Station not found"),
        (status = 409, description = "Charger id already in use")
    )
)]
pub async fn add_charger(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<u32>,
    ValidatedJson(body): ValidatedJson<AddChargerRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ChargerDto>>)> {
    let charger = state
        .stations
        .add_charger(&principal, id, body.id, body.kind.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(charger.into()))))
}
