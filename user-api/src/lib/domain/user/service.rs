use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Claims;
use chrono::Utc;

use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::Password;
use crate::domain::user::models::Role;
use crate::domain::user::models::Session;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    token_expiration_hours: Option<i64>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token signing, bound to the signing secret
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
            token_expiration_hours: None,
        }
    }

    /// Embed an `exp` claim in issued tokens.
    ///
    /// Without this, tokens stay valid for as long as their user exists and
    /// the signing secret is unchanged.
    pub fn with_token_expiration_hours(mut self, hours: i64) -> Self {
        self.token_expiration_hours = Some(hours);
        self
    }

    /// Make sure an administrator account exists.
    ///
    /// Registration never grants the admin role, so this is how the first
    /// admin gets provisioned. An existing user with that name is left as is.
    pub async fn ensure_admin(
        &self,
        username: Username,
        password: Password,
    ) -> Result<User, UserError> {
        if let Some(existing) = self.repository.find_by_username(&username).await? {
            if existing.role != Role::Admin {
                tracing::warn!(
                    username = %existing.username,
                    "Bootstrap admin name is taken by a non-admin user"
                );
            }
            return Ok(existing);
        }

        let user = User {
            id: UserId::new(),
            username,
            password_hash: self.hash_password(&password)?,
            role: Role::Admin,
            created_at: Utc::now(),
        };

        let admin = self.repository.create(user).await?;
        tracing::info!(user_id = %admin.id, username = %admin.username, "Admin user created");

        Ok(admin)
    }

    fn hash_password(&self, password: &Password) -> Result<String, UserError> {
        self.authenticator
            .hash_password(password.expose())
            .map_err(|e| UserError::Unknown(format!("Password hashing failed: {}", e)))
    }

    fn claims_for(&self, user: &User) -> Claims {
        let claims = Claims::new(user.id, user.role);
        match self.token_expiration_hours {
            Some(hours) => claims.with_expiration_hours(hours),
            None => claims,
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        let user = User {
            id: UserId::new(),
            username: command.username,
            password_hash: self.hash_password(&command.password)?,
            role: Role::User,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            "User registered"
        );

        Ok(created_user)
    }

    async fn login(&self, command: LoginCommand) -> Result<Session, UserError> {
        // A username that cannot exist is treated as an unknown one
        let found = match Username::new(command.username) {
            Ok(username) => self.repository.find_by_username(&username).await?,
            Err(_) => None,
        };

        // Unknown accounts still pay for a hash verification
        let Some(user) = found else {
            return Err(login_error(
                self.authenticator
                    .reject_without_hash(command.password.expose()),
            ));
        };

        let claims = self.claims_for(&user);

        let result = self
            .authenticator
            .authenticate(command.password.expose(), &user.password_hash, &claims)
            .map_err(login_error)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(Session {
            user,
            token: result.access_token,
        })
    }

    async fn verify_session(&self, token: &str) -> Result<AuthenticatedUser, UserError> {
        let claims = self.authenticator.validate_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            UserError::InvalidToken
        })?;

        let id = UserId::from_string(&claims.id).map_err(|e| {
            tracing::debug!(error = %e, "Session token names a malformed user id");
            UserError::InvalidToken
        })?;

        let role: Role = claims.role.parse().map_err(|e| {
            tracing::debug!(error = %e, "Session token carries an unknown role");
            UserError::InvalidToken
        })?;

        if self.repository.find_by_id(&id).await?.is_none() {
            tracing::debug!(user_id = %id, "Session token names a user that no longer exists");
            return Err(UserError::InvalidToken);
        }

        Ok(AuthenticatedUser { id, role })
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or(UserError::NotFoundByUsername(username.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn update_user(
        &self,
        caller: &AuthenticatedUser,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(&caller.id)
            .await?
            .ok_or(UserError::NotFound(caller.id.to_string()))?;

        if let Some(new_username) = command.username {
            user.username = new_username;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.hash_password(&new_password)?;
        }

        let updated_user = self
            .repository
            .update(user)
            .await?
            .ok_or(UserError::NotFound(caller.id.to_string()))?;

        tracing::info!(user_id = %updated_user.id, "User updated");

        Ok(updated_user)
    }

    async fn delete_user(
        &self,
        caller: &AuthenticatedUser,
        id: &UserId,
    ) -> Result<User, UserError> {
        caller.require_role(Role::Admin)?;

        let deleted_user = self
            .repository
            .delete(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        tracing::info!(
            user_id = %deleted_user.id,
            deleted_by = %caller.id,
            "User deleted"
        );

        Ok(deleted_user)
    }
}

fn login_error(err: AuthenticationError) -> UserError {
    match err {
        AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
        AuthenticationError::PasswordError(e) => {
            UserError::Unknown(format!("Password verification failed: {}", e))
        }
        AuthenticationError::JwtError(e) => {
            UserError::Unknown(format!("Token generation failed: {}", e))
        }
    }
}
