use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::Data;
use super::UserData;
use super::ValidPath;
use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Delete any user by id. Admin only.
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    ValidPath(id): ValidPath<String>,
) -> Result<ApiSuccess<Data<UserData>>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;

    state
        .user_service
        .delete_user(&caller, &user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, "User deleted", Data { data: user.into() }))
}
