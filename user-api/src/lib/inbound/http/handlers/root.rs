use axum::http::StatusCode;

use super::ApiSuccess;
use super::Empty;

pub async fn api_location() -> ApiSuccess<Empty> {
    ApiSuccess::new(StatusCode::OK, "API location: api/v1", Empty {})
}
