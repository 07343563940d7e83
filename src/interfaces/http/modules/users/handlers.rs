//! User API handlers
//!
//! Access rules live in the services; handlers only translate.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use super::dto::{RechargeRequest, RechargeResponse, UserDto};
use crate::application::Principal;
use crate::interfaces::http::common::{ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::modules::sessions::SessionDto;
use crate::interfaces::http::router::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = ApiResponse<Vec<UserDto>>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<ApiResponse<Vec<UserDto>>>> {
    let users = state.users.list_users(&principal).await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserDto>),
        (status = 403, description = "Neither self nor admin"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<UserDto>>> {
    let user = state.users.get_user(&principal, id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/recharge",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = RechargeRequest,
    responses(
        (status = 200, description = "Balance recharged", body = ApiResponse<RechargeResponse>),
        (status = 403, description = "Only your own balance can be recharged"),
        (status = 422, description = "Amount must be positive")
    )
)]
pub async fn recharge(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<RechargeRequest>,
) -> ApiResult<Json<ApiResponse<RechargeResponse>>> {
    let recharge = state.users.recharge(&principal, id, body.amount).await?;
    Ok(Json(ApiResponse::success(recharge.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/sessions",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Session history, newest first", body = ApiResponse<Vec<SessionDto>>),
        (status = 403, description = "Neither self nor admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn session_history(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<SessionDto>>>> {
    let sessions = state.charging.history(&principal, id).await?;
    Ok(Json(ApiResponse::success(
        sessions.into_iter().map(SessionDto::from).collect(),
    )))
}
