//! Login endpoint

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::user::{LoginRequest, UserSummary},
};

/// Log a user in by plain credential equality
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserSummary),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<UserSummary>> {
    let user = state
        .services
        .users
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(user.into()))
}
