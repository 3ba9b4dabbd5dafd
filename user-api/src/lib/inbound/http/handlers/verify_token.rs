use axum::http::StatusCode;
use serde::Serialize;

use super::ApiSuccess;
use crate::domain::user::models::AuthenticatedUser;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyTokenResponseData {
    pub user: AuthenticatedUser,
}

/// Echo the identity the authentication middleware attached.
pub async fn verify_token(caller: AuthenticatedUser) -> ApiSuccess<VerifyTokenResponseData> {
    ApiSuccess::new(
        StatusCode::OK,
        "Token valid",
        VerifyTokenResponseData { user: caller },
    )
}
