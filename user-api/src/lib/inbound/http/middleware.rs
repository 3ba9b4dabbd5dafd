use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::user::models::AuthenticatedUser;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

const TOKEN_NOT_VALID: &str = "token not valid";

/// Middleware that verifies the bearer token and attaches the caller's identity.
///
/// Rejects with 403 before the handler runs when the header is missing or
/// malformed, the token does not verify, or its user no longer exists.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(req.headers())?;

    let caller = state
        .user_service
        .verify_session(token)
        .await
        .map_err(ApiError::from)?;

    tracing::debug!(user_id = %caller.id, role = %caller.role, "Request authenticated");

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// The header must split into exactly two space-separated parts.
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let rejected = || ApiError::Forbidden(TOKEN_NOT_VALID.to_string());

    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(rejected)?
        .to_str()
        .map_err(|_| rejected())?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Ok(token)
        }
        _ => Err(rejected()),
    }
}

/// The caller attached by [`authenticate`].
///
/// Fails with 403 on routes where the middleware did not run or rejected.
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| ApiError::Forbidden(TOKEN_NOT_VALID.to_string()))
    }
}

/// Outermost boundary: turns every recorded failure into its JSON body.
///
/// Handlers, extractors and the authentication layer only record an
/// [`ApiError`] on the response; any other error status (routing, the
/// timeout layer) is rendered from its status alone. Each failure is logged once.
pub async fn render_failures(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let failure = match response.extensions().get::<ApiError>() {
        Some(error) => error.clone(),
        None if is_failure(&response) => ApiError::from_status(response.status()),
        None => return response,
    };

    if failure.status().is_server_error() {
        tracing::error!(status = failure.status().as_u16(), error = ?failure, "Request failed");
    } else {
        tracing::warn!(status = failure.status().as_u16(), message = failure.message(), "Request rejected");
    }

    failure.render(state.expose_error_detail)
}

fn is_failure(response: &Response) -> bool {
    let status = response.status();
    status.is_client_error() || status.is_server_error()
}
