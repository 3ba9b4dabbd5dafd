use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::Claims;
use auth::JwtHandler;
use serde_json::json;
use serde_json::Value;
use user_api::domain::user::models::Password;
use user_api::domain::user::models::Username;
use user_api::domain::user::service::UserService;
use user_api::inbound::http::router::create_router;
use user_api::inbound::http::router::RouterConfig;
use user_api::outbound::repositories::InMemoryUserRepository;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Test application that spawns a real server over an in-memory store
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

/// Knobs that differ between test scenarios
pub struct TestOptions {
    pub expose_error_detail: bool,
    pub token_expiration_hours: Option<i64>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            expose_error_detail: true,
            token_expiration_hours: None,
        }
    }
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(TestOptions::default()).await
    }

    pub async fn spawn_with(options: TestOptions) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let user_repo = Arc::new(InMemoryUserRepository::new());
        let authenticator = Arc::new(Authenticator::new(JWT_SECRET));

        let mut user_service = UserService::new(user_repo, authenticator);
        if let Some(hours) = options.token_expiration_hours {
            user_service = user_service.with_token_expiration_hours(hours);
        }

        user_service
            .ensure_admin(
                Username::new(ADMIN_USERNAME.to_string()).unwrap(),
                Password::new(ADMIN_PASSWORD.to_string()).unwrap(),
            )
            .await
            .expect("Failed to provision admin");

        let router = create_router(
            Arc::new(user_service),
            RouterConfig {
                expose_error_detail: options.expose_error_detail,
                request_timeout: Duration::from_secs(10),
            },
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(JWT_SECRET),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(self.url(path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.put(path).bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(self.url(path)).bearer_auth(token)
    }

    /// Register a user and return its id
    pub async fn register(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/api/v1/users")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Log in and return the raw response
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/api/v1/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the issued token
    pub async fn token_for(&self, username: &str, password: &str) -> String {
        let response = self.login(username, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.token_for(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    /// Sign arbitrary claims with the server's secret
    pub fn forge_token(&self, claims: &Claims) -> String {
        self.jwt_handler.encode(claims).unwrap()
    }
}
