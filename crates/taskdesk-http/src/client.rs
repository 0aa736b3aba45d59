//! High-level client tying the session store, pipeline, and services together.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use taskdesk_core::traits::TokenStorage;
use taskdesk_core::{
    AccessToken, Credentials, ProfileUpdate, RefreshToken, Registration, Result, UserIdentity,
};

use crate::config::ClientConfig;
use crate::http::endpoints::{AuthPayload, LOGIN, PROFILE, REGISTER};
use crate::http::{ApiClient, PendingRequest};
use crate::pipeline::AuthPipeline;
use crate::services::{Dashboard, Projects, Tasks};
use crate::session::{Session, SessionEvent, SessionStore};

/// A taskdesk API client bound to one session.
///
/// Cheap to clone; clones share the session and the refresh gate.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdesk_core::{Credentials, TaskFilter};
/// use taskdesk_http::{ClientConfig, MemoryStorage, TaskDeskClient};
///
/// # async fn example() -> Result<(), taskdesk_core::Error> {
/// let client = TaskDeskClient::new(ClientConfig::from_env()?, Arc::new(MemoryStorage::new()))?;
/// client.initialize().await;
/// client
///     .login(Credentials::new("ada@example.com", "Password123"))
///     .await?;
///
/// for task in client.tasks().list(&TaskFilter::default()).await? {
///     println!("{} [{}]", task.title, task.status);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TaskDeskClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    config: ClientConfig,
    pipeline: AuthPipeline,
}

impl TaskDeskClient {
    /// Create a client whose session persists through `storage`.
    ///
    /// The session starts out loading; call [`TaskDeskClient::initialize`]
    /// to restore persisted tokens.
    pub fn new(config: ClientConfig, storage: Arc<dyn TokenStorage>) -> Result<Self> {
        let http = ApiClient::new(&config)?;
        let session = Arc::new(SessionStore::new(storage));
        let pipeline = AuthPipeline::new(http, session);

        Ok(Self {
            inner: Arc::new(ClientInner { config, pipeline }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.inner.pipeline.session()
    }

    pub fn pipeline(&self) -> &AuthPipeline {
        &self.inner.pipeline
    }

    /// Subscribe to session lifecycle notifications, including
    /// [`SessionEvent::LoginRequired`].
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session().subscribe()
    }

    /// Restore the persisted session, validating it against the server.
    pub async fn initialize(&self) -> Session {
        self.session().initialize(&self.inner.pipeline).await
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Log in and establish a session.
    ///
    /// On failure the session's error message is set and the existing
    /// session, if any, is left in place.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: Credentials) -> Result<UserIdentity> {
        info!("Logging in");
        let outcome = match credentials.validate() {
            Ok(()) => self.authenticate(LOGIN, &credentials).await,
            Err(err) => Err(err),
        };
        self.record_outcome(outcome, "Login failed").await
    }

    /// Create an account and establish a session for it.
    #[instrument(skip(self, registration), fields(email = %registration.email()))]
    pub async fn register(&self, registration: Registration) -> Result<UserIdentity> {
        info!("Registering");
        let outcome = match registration.validate() {
            Ok(()) => self.authenticate(REGISTER, &registration).await,
            Err(err) => Err(err),
        };
        self.record_outcome(outcome, "Registration failed").await
    }

    /// Login and registration go straight to the transport: a `401` here
    /// means bad credentials, not an expired session.
    async fn authenticate<B: Serialize>(&self, path: &str, body: &B) -> Result<UserIdentity> {
        self.session().set_error(None).await;

        let request = PendingRequest::post(path, body)?;
        let payload: AuthPayload = self
            .inner
            .pipeline
            .http()
            .execute(&request, None)
            .await?
            .into_data()?;

        let user = payload.user.clone();
        self.session()
            .establish(
                AccessToken::new(payload.access_token),
                RefreshToken::new(payload.refresh_token),
                payload.user,
            )
            .await?;
        Ok(user)
    }

    async fn record_outcome<T>(&self, outcome: Result<T>, fallback: &str) -> Result<T> {
        if let Err(ref err) = outcome {
            warn!(error = %err, "{fallback}");
            self.session()
                .set_error(Some(err.user_message(fallback)))
                .await;
        }
        outcome
    }

    /// End the session. Never fails.
    pub async fn logout(&self) {
        info!("Logging out");
        self.session().clear().await;
    }

    /// Fetch the current identity from the server and store it.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<UserIdentity> {
        let user: UserIdentity = self.inner.pipeline.get(PROFILE).await?.into_data()?;
        self.session().update_identity(user.clone()).await;
        Ok(user)
    }

    /// Change the signed-in user's name, email, or password.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserIdentity> {
        let outcome = match update.validate() {
            Ok(()) => self.put_profile(&update).await,
            Err(err) => Err(err),
        };
        self.record_outcome(outcome, "Profile update failed").await
    }

    async fn put_profile(&self, update: &ProfileUpdate) -> Result<UserIdentity> {
        self.session().set_error(None).await;
        let user: UserIdentity = self
            .inner
            .pipeline
            .put(PROFILE, update)
            .await?
            .into_data()?;
        info!(user_id = user.id, "Profile updated");
        self.session().update_identity(user.clone()).await;
        Ok(user)
    }

    /// Exchange the refresh token for a new access token now.
    pub async fn refresh(&self) -> Result<AccessToken> {
        self.inner.pipeline.refresh().await
    }

    // ========================================================================
    // Services
    // ========================================================================

    pub fn tasks(&self) -> Tasks<'_> {
        Tasks::new(&self.inner.pipeline)
    }

    pub fn projects(&self) -> Projects<'_> {
        Projects::new(&self.inner.pipeline)
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(self.tasks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn client() -> TaskDeskClient {
        TaskDeskClient::new(ClientConfig::default(), Arc::new(MemoryStorage::new())).unwrap()
    }

    #[tokio::test]
    async fn invalid_login_sets_error_without_request() {
        let client = client();
        let err = client
            .login(Credentials::new("not-an-email", "Password123"))
            .await
            .unwrap_err();

        assert!(matches!(err, taskdesk_core::Error::InvalidInput(_)));
        assert_eq!(client.session().error().await.as_deref(), Some("Login failed"));
        assert!(!client.session().is_authenticated().await);
    }

    #[tokio::test]
    async fn logout_without_session_is_quiet() {
        let client = client();
        let mut events = client.subscribe();
        client.logout().await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn clones_share_session() {
        let client = client();
        let other = client.clone();
        assert!(Arc::ptr_eq(client.session(), other.session()));
    }
}
