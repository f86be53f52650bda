//! API for registration, credential checks and role management.

use std::fmt::Debug;

use crate::{
    db_types::{NewUser, Role, Roles, UserAccount, UserId},
    traits::{AuthApiError, AuthManagement},
};

pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    /// Creates a new account carrying the default `User` role. The password is hashed before being stored.
    pub async fn register_user(&self, user: NewUser) -> Result<UserAccount, AuthApiError> {
        self.db.register_user(user).await
    }

    /// Checks an email / password pair, returning the matching account on success. On failure the error does not
    /// reveal whether the email is registered.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<UserAccount, AuthApiError> {
        self.db.verify_credentials(email, password).await
    }

    pub async fn fetch_roles_for_user(&self, user_id: UserId) -> Result<Roles, AuthApiError> {
        self.db.fetch_roles_for_user(user_id).await
    }

    pub async fn check_user_has_roles(&self, user_id: UserId, roles: &[Role]) -> Result<(), AuthApiError> {
        self.db.check_user_has_roles(user_id, roles).await
    }

    /// Assigns the given roles to the account registered under `email`. Granting a role the user already holds is
    /// a silent no-op.
    pub async fn assign_roles(&self, email: &str, roles: &[Role]) -> Result<(), AuthApiError> {
        self.db.assign_roles(email, roles).await
    }

    /// Removes the given roles, returning the number actually removed.
    pub async fn remove_roles(&self, email: &str, roles: &[Role]) -> Result<u64, AuthApiError> {
        self.db.remove_roles(email, roles).await
    }
}
