//! Authentication state: bearer token and cached user profile.

use chrono::Utc;
use secrecy::SecretString;
use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use ecom_core::{AuthRequest, AuthResponse, User};

use super::StoreError;
use crate::api::ApiClient;
use crate::models::session_keys;

/// Session-backed authentication state for one visitor.
///
/// The token is the source of truth; the cached [`User`] saves a round trip
/// to `GET /auth/me` on every page.
pub struct AuthStore<'a> {
    api: &'a ApiClient,
    session: &'a Session,
}

impl<'a> AuthStore<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, session: &'a Session) -> Self {
        Self { api, session }
    }

    /// The persisted bearer token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn token(&self) -> Result<Option<SecretString>, StoreError> {
        let token: Option<String> = self.session.get(session_keys::TOKEN).await?;
        Ok(token.map(SecretString::from))
    }

    /// A client that acts on behalf of this visitor.
    ///
    /// Anonymous visitors get the shared client unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn authorized_api(&self) -> Result<ApiClient, StoreError> {
        Ok(match self.token().await? {
            Some(token) => self.api.with_token(token),
            None => self.api.clone(),
        })
    }

    /// Like [`Self::authorized_api`], falling back to the shared client
    /// when the session cannot be read.
    pub async fn api_or_anonymous(&self) -> ApiClient {
        self.authorized_api().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read auth token, continuing anonymously");
            self.api.clone()
        })
    }

    /// Re-establish the user from the persisted token.
    ///
    /// A token the backend no longer accepts is forgotten; the failure is
    /// logged rather than returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if the session cannot be read or written.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Option<User>, StoreError> {
        let Some(token) = self.token().await? else {
            return Ok(None);
        };

        match self.api.with_token(token).current_user().await {
            Ok(user) => {
                self.session
                    .insert(session_keys::CURRENT_USER, &user)
                    .await?;
                Ok(Some(user))
            }
            Err(e) => {
                warn!(error = %e, "Could not restore user from stored token, forgetting it");
                self.logout().await?;
                Ok(None)
            }
        }
    }

    /// The logged-in user, restoring from the token when not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn current_user(&self) -> Result<Option<User>, StoreError> {
        let cached: Option<User> = self.session.get(session_keys::CURRENT_USER).await?;
        match cached {
            Some(user) => Ok(Some(user)),
            None => self.restore().await,
        }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the credentials are rejected.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn login(&self, request: &AuthRequest) -> Result<User, StoreError> {
        let response = self.api.login(request).await?;
        self.persist(&response).await
    }

    /// Create an account and log in as it.
    ///
    /// # Errors
    ///
    /// Returns the backend error when registration is refused.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: &AuthRequest) -> Result<User, StoreError> {
        let response = self.api.register(request).await?;
        self.persist(&response).await
    }

    /// Forget the token and cached user. The backend is not contacted.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn logout(&self) -> Result<(), StoreError> {
        self.session.remove::<String>(session_keys::TOKEN).await?;
        self.session
            .remove::<User>(session_keys::CURRENT_USER)
            .await?;
        Ok(())
    }

    /// Whether a user is logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn is_authenticated(&self) -> Result<bool, StoreError> {
        Ok(self.current_user().await?.is_some())
    }

    /// Whether the logged-in user is an administrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn is_admin(&self) -> Result<bool, StoreError> {
        Ok(self
            .current_user()
            .await?
            .is_some_and(|user| user.is_admin()))
    }

    async fn persist(&self, response: &AuthResponse) -> Result<User, StoreError> {
        // New privilege level, new session id.
        self.session.cycle_id().await?;

        let user = response.to_user(Utc::now());
        self.session
            .insert(session_keys::TOKEN, &response.token)
            .await?;
        self.session
            .insert(session_keys::CURRENT_USER, &user)
            .await?;

        debug!(user_id = %user.id, role = %user.role, "Visitor authenticated");
        Ok(user)
    }
}
