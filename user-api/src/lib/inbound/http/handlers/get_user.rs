use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::Data;
use super::UserData;
use super::ValidPath;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn get_user(
    State(state): State<AppState>,
    ValidPath(user_id): ValidPath<String>,
) -> Result<ApiSuccess<Data<UserData>>, ApiError> {
    let user_id = UserId::from_string(&user_id).map_err(UserError::from)?;

    state
        .user_service
        .get_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, "User found", Data { data: user.into() }))
}

/// Lookup by name. A name that could never have been registered is simply not found.
pub async fn get_user_by_username(
    State(state): State<AppState>,
    ValidPath(username): ValidPath<String>,
) -> Result<ApiSuccess<Data<UserData>>, ApiError> {
    let username = Username::new(username)
        .map_err(|e| ApiError::from(UserError::NotFoundByUsername(e.to_string())))?;

    state
        .user_service
        .get_user_by_username(&username)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, "User found", Data { data: user.into() }))
}
