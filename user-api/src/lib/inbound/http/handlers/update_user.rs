use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::Data;
use super::UserData;
use super::ValidJson;
use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// HTTP request body for updating the caller (raw JSON)
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, UserError> {
        let username = self.username.map(Username::new).transpose()?;
        let password = self.password.map(Password::new).transpose()?;

        Ok(UpdateUserCommand { username, password })
    }
}

/// Update the authenticated caller. The target is never taken from the request.
pub async fn update_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    ValidJson(req): ValidJson<UpdateUserRequest>,
) -> Result<ApiSuccess<Data<UserData>>, ApiError> {
    let command = req.try_into_command()?;

    state
        .user_service
        .update_user(&caller, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, "User updated", Data { data: user.into() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update_keeps_absent_fields_empty() {
        let command = UpdateUserRequest {
            username: Some("alicia".to_string()),
            password: None,
        }
        .try_into_command()
        .unwrap();

        assert_eq!(command.username.unwrap().as_str(), "alicia");
        assert!(command.password.is_none());
    }

    #[test]
    fn test_invalid_username_rejected() {
        let result = UpdateUserRequest {
            username: Some("a!".to_string()),
            password: None,
        }
        .try_into_command();

        assert!(matches!(result, Err(UserError::InvalidUsername(_))));
    }
}
