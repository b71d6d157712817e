//! User handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::db::NewUser;
use crate::provisioning::ProvisionOutcome;
use crate::web::dto::{ApiResponse, CreateUserRequest, UserDetailResponse, UserResponse};
use crate::web::error::ApiError;

/// POST /api/users - Create a user and run the user-created subscribers.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let new_user = NewUser::try_from(req)?;
    let user = state.users.create_user(new_user).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(UserResponse::from(user))),
    ))
}

/// GET /api/users/:name - User with linked email accounts and comments.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<UserDetailResponse>>, ApiError> {
    let detail = state.users.get_detail(&name).await?;
    Ok(Json(ApiResponse::new(detail.into())))
}

/// POST /api/users/:name/provision - Run the provisioning workflow again.
pub async fn provision_user(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<ProvisionOutcome>>, ApiError> {
    let user = state.users.get_user(&name).await?;
    let outcome = state.provisioner.provision(&user).await?;
    Ok(Json(ApiResponse::new(outcome)))
}
