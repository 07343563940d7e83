//! Maintenance handlers (admin only)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    CompleteMaintenanceRequest, ListMaintenanceParams, MaintenanceDto, ScheduleMaintenanceRequest,
};
use crate::application::Principal;
use crate::interfaces::http::common::{ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::router::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/maintenance",
    tag = "Maintenance",
    security(("bearer_auth" = [])),
    params(ListMaintenanceParams),
    responses(
        (status = 200, description = "Maintenance records", body = ApiResponse<Vec<MaintenanceDto>>),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_maintenance(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ListMaintenanceParams>,
) -> ApiResult<Json<ApiResponse<Vec<MaintenanceDto>>>> {
    let records = state.maintenance.list(&principal, params.station_id).await?;
    Ok(Json(ApiResponse::success(
        records.into_iter().map(MaintenanceDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/maintenance",
    tag = "Maintenance",
    security(("bearer_auth" = [])),
    request_body = ScheduleMaintenanceRequest,
    responses(
        (status = 201, description = "Maintenance scheduled", body = ApiResponse<MaintenanceDto>),
        (status = 400, description = "Missing kind detail or charger not at station"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Station or charger not found")
    )
)]
pub async fn schedule_maintenance(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(body): ValidatedJson<ScheduleMaintenanceRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<MaintenanceDto>>)> {
    let record = state
        .maintenance
        .schedule(&principal, body.into_command()?)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/maintenance/{id}",
    tag = "Maintenance",
    security(("bearer_auth" = [])),
    params(("id" = u32, Path, description = "Maintenance record ID")),
    responses(
        (status = 200, description = "Maintenance record", body = ApiResponse<MaintenanceDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_maintenance(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<u32>,
) -> ApiResult<Json<ApiResponse<MaintenanceDto>>> {
    let record = state.maintenance.get(&principal, id).await?;
    Ok(Json(ApiResponse::success(record.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/maintenance/{id}/start",
    tag = "Maintenance",
    security(("bearer_auth" = [])),
    params(("id" = u32, Path, description = "Maintenance record ID")),
    responses(
        (status = 200, description = "Work started; charger out of service", body = ApiResponse<MaintenanceDto>),
        (status = 409, description = "Not scheduled, or charger occupied")
    )
)]
pub async fn start_maintenance(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<u32>,
) -> ApiResult<Json<ApiResponse<MaintenanceDto>>> {
    let record = state.maintenance.start(&principal, id).await?;
    Ok(Json(ApiResponse::success(record.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/maintenance/{id}/complete",
    tag = "Maintenance",
    security(("bearer_auth" = [])),
    params(("id" = u32, Path, description = "Maintenance record ID")),
    request_body(content = CompleteMaintenanceRequest, description = "Optional closing notes"),
    responses(
        (status = 200, description = "Work completed; charger back in service", body = ApiResponse<MaintenanceDto>),
        (status = 409, description = "Not in progress")
    )
)]
pub async fn complete_maintenance(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<u32>,
    ValidatedJson(body): ValidatedJson<CompleteMaintenanceRequest>,
) -> ApiResult<Json<ApiResponse<MaintenanceDto>>> {
    let record = state.maintenance.complete(&principal, id, body.notes).await?;
    Ok(Json(ApiResponse::success(record.into())))
}
