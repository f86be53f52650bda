use thiserror::Error;

use crate::db_types::{NewUser, Role, Roles, UserAccount, UserId};

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("An account with this email address already exists")]
    EmailAlreadyInUse,
    #[error("Invalid email address or password")]
    InvalidCredentials,
    #[error("No account matches the given email address")]
    UserNotFound,
    #[error("User is missing at least {0} of the required roles")]
    RoleNotAllowed(usize),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

/// The `AuthManagement` trait defines behaviour for managing registration, login credentials and roles.
///
/// Authentication itself is stateless and happens at the server level via access tokens. The backend only stores
/// accounts, salted password hashes, and role assignments; token issuance is the server's concern.
#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    /// Creates a new account with the `User` role. The password is hashed before it is stored.
    /// Fails with [`AuthApiError::EmailAlreadyInUse`] if the email is taken.
    async fn register_user(&self, user: NewUser) -> Result<UserAccount, AuthApiError>;

    /// Checks an email / password pair against the stored credentials, returning the account on success.
    /// Fails with [`AuthApiError::InvalidCredentials`] without revealing whether the email exists.
    async fn verify_credentials(&self, email: &str, password: &str) -> Result<UserAccount, AuthApiError>;

    /// Fetches the roles for the given user. If the user has no assignments, the request still succeeds and
    /// returns an empty vector.
    async fn fetch_roles_for_user(&self, user_id: UserId) -> Result<Roles, AuthApiError>;

    /// Checks whether a user holds **all** of the given roles. If any are missing, the error
    /// [`AuthApiError::RoleNotAllowed`] is returned with the number of missing roles as the parameter.
    async fn check_user_has_roles(&self, user_id: UserId, roles: &[Role]) -> Result<(), AuthApiError>;

    /// Assigns the given roles to the account registered under `email`. This function must be idempotent.
    async fn assign_roles(&self, email: &str, roles: &[Role]) -> Result<(), AuthApiError>;

    /// Removes the given roles from the account registered under `email`. The number of roles actually removed
    /// is returned. This function must be idempotent.
    async fn remove_roles(&self, email: &str, roles: &[Role]) -> Result<u64, AuthApiError>;
}
