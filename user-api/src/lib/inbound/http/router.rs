use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::OriginalUri;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_user::create_user;
use super::handlers::delete_user::delete_user;
use super::handlers::get_user::get_user;
use super::handlers::get_user::get_user_by_username;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::root::api_location;
use super::handlers::update_user::update_user;
use super::handlers::verify_token::verify_token;
use super::handlers::ApiError;
use super::middleware::authenticate as auth_middleware;
use super::middleware::render_failures;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    /// Include error detail (`stack`) in failure bodies
    pub expose_error_detail: bool,
}

pub struct RouterConfig {
    pub expose_error_detail: bool,
    pub request_timeout: Duration,
}

pub fn create_router(user_service: Arc<dyn UserServicePort>, config: RouterConfig) -> Router {
    let state = AppState {
        user_service,
        expose_error_detail: config.expose_error_detail,
    };

    let public_routes = Router::new()
        .route("/auth/login", post(login))
        .route("/users", post(create_user).get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/user/:username", get(get_user_by_username));

    // Layered per method so unsupported methods still fall through to 405
    let authenticated = || middleware::from_fn_with_state(state.clone(), auth_middleware);

    let protected_routes = Router::new()
        .route("/users", put(update_user).route_layer(authenticated()))
        .route(
            "/users/admin/:id",
            delete(delete_user).route_layer(authenticated()),
        )
        .route("/users/token", get(verify_token).route_layer(authenticated()));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .route("/", get(api_location))
        .nest(
            "/api/v1",
            Router::new().merge(public_routes).merge(protected_routes),
        )
        .fallback(not_found)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            render_failures,
        ))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("Not Found - {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::http::Method;
    use axum::http::StatusCode;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::user::models::AuthenticatedUser;
    use crate::domain::user::models::CreateUserCommand;
    use crate::domain::user::models::LoginCommand;
    use crate::domain::user::models::Session;
    use crate::domain::user::models::UpdateUserCommand;
    use crate::domain::user::models::User;
    use crate::domain::user::models::UserId;
    use crate::domain::user::models::Username;
    use crate::user::errors::UserError;

    /// Answers listings slower than any sensible request timeout.
    struct SlowUserService;

    #[async_trait]
    impl UserServicePort for SlowUserService {
        async fn create_user(&self, _command: CreateUserCommand) -> Result<User, UserError> {
            unimplemented!()
        }

        async fn login(&self, _command: LoginCommand) -> Result<Session, UserError> {
            unimplemented!()
        }

        async fn verify_session(&self, _token: &str) -> Result<AuthenticatedUser, UserError> {
            Err(UserError::InvalidToken)
        }

        async fn get_user(&self, _id: &UserId) -> Result<User, UserError> {
            Err(UserError::DatabaseError("connection reset".to_string()))
        }

        async fn get_user_by_username(&self, _username: &Username) -> Result<User, UserError> {
            unimplemented!()
        }

        async fn list_users(&self) -> Result<Vec<User>, UserError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }

        async fn update_user(
            &self,
            _caller: &AuthenticatedUser,
            _command: UpdateUserCommand,
        ) -> Result<User, UserError> {
            unimplemented!()
        }

        async fn delete_user(
            &self,
            _caller: &AuthenticatedUser,
            _id: &UserId,
        ) -> Result<User, UserError> {
            unimplemented!()
        }
    }

    fn router(expose_error_detail: bool) -> Router {
        create_router(
            Arc::new(SlowUserService),
            RouterConfig {
                expose_error_detail,
                request_timeout: Duration::from_millis(50),
            },
        )
    }

    async fn send(router: Router, uri: &str) -> (StatusCode, Value) {
        send_method(router, Method::GET, uri).await
    }

    async fn send_method(router: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_timeout_is_rendered_as_json() {
        let (status, body) = send(router(false), "/api/v1/users").await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body, serde_json::json!({ "message": "Request Timeout" }));
    }

    #[tokio::test]
    async fn test_store_failure_hides_cause() {
        let uri = format!("/api/v1/users/{}", UserId::new());

        let (status, body) = send(router(false), &uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({ "message": "Something went wrong with the server" })
        );

        let (_, body) = send(router(true), &uri).await;
        assert!(body["stack"]
            .as_str()
            .unwrap()
            .contains("connection reset"));
    }

    #[tokio::test]
    async fn test_fallback_reports_full_path() {
        let (status, body) = send(router(false), "/api/v1/missing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Not Found - /api/v1/missing");
    }

    #[tokio::test]
    async fn test_unsupported_method_on_protected_path_is_not_authenticated() {
        for (method, uri) in [
            (Method::PATCH, "/api/v1/users"),
            (Method::POST, "/api/v1/users/token"),
            (Method::GET, "/api/v1/users/admin/42"),
        ] {
            let (status, body) = send_method(router(false), method.clone(), uri).await;

            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
            assert_eq!(body, serde_json::json!({ "message": "Method Not Allowed" }));
        }
    }

    #[tokio::test]
    async fn test_protected_methods_still_require_a_token() {
        for (method, uri) in [
            (Method::PUT, "/api/v1/users"),
            (Method::GET, "/api/v1/users/token"),
            (Method::DELETE, "/api/v1/users/admin/42"),
        ] {
            let (status, body) = send_method(router(false), method.clone(), uri).await;

            assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
            assert_eq!(body["message"], "token not valid");
        }
    }
}
