//! Authentication endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{LoginRequest, UserProfile},
};

use super::{AuthenticatedUser, DataResponse, JsonBody};

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, profile and token wrapped in `data`", body = UserProfile),
        (status = 422, description = "Invalid input, wrong credentials or disabled account", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    let profile = state.services.auth.login(request).await?;
    Ok(Json(DataResponse::new(profile)))
}

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/auth/user",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user, wrapped in `data`", body = UserProfile),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    )
)]
pub async fn current_user(AuthenticatedUser(current): AuthenticatedUser) -> Json<DataResponse<UserProfile>> {
    Json(DataResponse::new(UserProfile::new(&current.user, Some(current.token))))
}
