use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::Data;
use super::UserData;
use super::ValidJson;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Password;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Register a new user. The role is always `user`.
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateUserRequest>,
) -> Result<ApiSuccess<Data<UserData>>, ApiError> {
    state
        .user_service
        .create_user(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| {
            ApiSuccess::new(StatusCode::CREATED, "User created", Data { data: user.into() })
        })
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserRequest {
    username: String,
    password: String,
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<CreateUserCommand, UserError> {
        let username = Username::new(self.username)?;
        let password = Password::new(self.password)?;
        Ok(CreateUserCommand::new(username, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_request_converts() {
        let command = request("alice", "s3cret").try_into_command().unwrap();

        assert_eq!(command.username.as_str(), "alice");
        assert_eq!(command.password.expose(), "s3cret");
    }

    #[test]
    fn test_invalid_fields_are_bad_requests() {
        for (username, password) in [("al", "s3cret"), ("alice smith", "s3cret"), ("alice", "")] {
            let err = ApiError::from(request(username, password).try_into_command().unwrap_err());
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }
}
