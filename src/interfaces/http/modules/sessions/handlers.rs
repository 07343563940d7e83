//! Charging session handlers
//!
//! A user always acts on their own session; the principal decides which.

use axum::{extract::State, http::StatusCode, Extension, Json};

use super::dto::{CloseSessionResponse, SessionDto, StartSessionRequest};
use crate::application::Principal;
use crate::interfaces::http::common::{ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::router::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    security(("bearer_auth" = [])),
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session opened on a free charger", body = ApiResponse<SessionDto>),
        (status = 403, description = "Admins cannot charge"),
        (status = 404, description = "Station not found or no charger available"),
        (status = 409, description = "An open session already exists")
    )
)]
pub async fn start_session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(body): ValidatedJson<StartSessionRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<SessionDto>>)> {
    let session = state.charging.start(&principal, body.station_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(session.into()))))
}

#[utoipa::path(
    post,
    path = "/api/v1/sessions/close",
    tag = "Sessions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session closed and billed", body = ApiResponse<CloseSessionResponse>),
        (status = 402, description = "Balance does not cover the cost"),
        (status = 404, description = "No open session")
    )
)]
pub async fn close_session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<ApiResponse<CloseSessionResponse>>> {
    let closed = state.charging.close(&principal).await?;
    Ok(Json(ApiResponse::success(closed.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/sessions/active",
    tag = "Sessions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Open session, or null", body = ApiResponse<SessionDto>)
    )
)]
pub async fn active_session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<ApiResponse<Option<SessionDto>>>> {
    let session = state.charging.active(&principal).await?;
    Ok(Json(ApiResponse::success(session.map(SessionDto::from))))
}
