use async_trait::async_trait;

use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::Session;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::models::Username;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user with the default role.
    ///
    /// # Arguments
    /// * `command` - Validated command containing username and password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `Unknown` - Password hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Check credentials and issue a session token.
    ///
    /// # Returns
    /// The authenticated user together with a signed token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password, indistinguishably
    /// * `Unknown` - Stored hash unreadable or token signing failed
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, command: LoginCommand) -> Result<Session, UserError>;

    /// Verify a session token and confirm its user still exists.
    ///
    /// # Returns
    /// Identity and role to attach to the current request
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, malformed token, unknown claims or deleted user
    /// * `DatabaseError` - Database operation failed
    async fn verify_session(&self, token: &str) -> Result<AuthenticatedUser, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve user by unique username.
    ///
    /// # Errors
    /// * `NotFoundByUsername` - No user with this username
    /// * `DatabaseError` - Database operation failed
    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError>;

    /// Retrieve every registered user.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Update the calling user with optional fields.
    ///
    /// The target is always the authenticated identity, never a client-supplied id.
    ///
    /// # Errors
    /// * `NotFound` - User was deleted after the token was verified
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn update_user(
        &self,
        caller: &AuthenticatedUser,
        command: UpdateUserCommand,
    ) -> Result<User, UserError>;

    /// Delete a user. Restricted to administrators.
    ///
    /// # Returns
    /// The deleted user entity
    ///
    /// # Errors
    /// * `Forbidden` - Caller is not an admin (the store is not touched)
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, caller: &AuthenticatedUser, id: &UserId)
        -> Result<User, UserError>;
}

/// Persistence operations for user aggregate.
///
/// Absence is reported as `None`, errors are reserved for storage faults and
/// uniqueness violations.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by username.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve all users from storage.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Replace the stored record with the same id.
    ///
    /// # Returns
    /// Updated user entity, or `None` when no record has this id
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<Option<User>, UserError>;

    /// Remove user from storage.
    ///
    /// # Returns
    /// The removed user entity, or `None` when no record has this id
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<Option<User>, UserError>;
}
