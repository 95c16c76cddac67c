//! Authentication payloads and the user entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{UserId, UserRole};

/// An authenticated user as returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the user may open the admin dashboard.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Credentials for `POST /auth/login` and `POST /auth/register`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Response to a successful login or registration.
///
/// Implements `Debug` manually to redact the bearer token.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
    pub token: String,
}

impl AuthResponse {
    /// Build the cached user from this response.
    ///
    /// The auth endpoints do not return a creation date, so the caller
    /// supplies one (the moment of login).
    #[must_use]
    pub fn to_user(&self, created_at: DateTime<Utc>) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at,
        }
    }
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
