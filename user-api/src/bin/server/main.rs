use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_api::config::Config;
use user_api::domain::user::models::Password;
use user_api::domain::user::models::Username;
use user_api::domain::user::ports::UserRepository;
use user_api::domain::user::ports::UserServicePort;
use user_api::domain::user::service::UserService;
use user_api::inbound::http::router::create_router;
use user_api::inbound::http::router::RouterConfig;
use user_api::outbound::repositories::InMemoryUserRepository;
use user_api::outbound::repositories::PostgresUserRepository;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-api",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        run_mode = %config.run_mode,
        http_port = config.server.http_port,
        request_timeout_secs = config.server.request_timeout_secs,
        token_expiration_hours = ?config.jwt.expiration_hours,
        persistent = config.database.is_some(),
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::new(config.jwt.secret.as_bytes()));

    let user_service = match &config.database {
        Some(database) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database.url)
                .await?;
            tracing::info!(
                max_connections = 5,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
            build_user_service(user_repository, authenticator, &config).await?
        }
        None => {
            tracing::warn!("No database configured, users are kept in memory");
            let user_repository = Arc::new(InMemoryUserRepository::new());
            build_user_service(user_repository, authenticator, &config).await?
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        user_service,
        RouterConfig {
            expose_error_detail: config.is_development(),
            request_timeout: Duration::from_secs(config.server.request_timeout_secs),
        },
    );

    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");

    Ok(())
}

/// Wire the service over a repository and provision the configured admin.
async fn build_user_service<UR>(
    user_repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    config: &Config,
) -> Result<Arc<dyn UserServicePort>, anyhow::Error>
where
    UR: UserRepository,
{
    let mut user_service = UserService::new(user_repository, authenticator);
    if let Some(hours) = config.jwt.expiration_hours {
        user_service = user_service.with_token_expiration_hours(hours);
    }

    if let Some(admin) = &config.admin {
        let username = Username::new(admin.username.clone())?;
        let password = Password::new(admin.password.clone())?;
        user_service.ensure_admin(username, password).await?;
    }

    Ok(Arc::new(user_service))
}
