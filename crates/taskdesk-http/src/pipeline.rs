//! Authenticated request pipeline.
//!
//! Every authenticated call goes through [`AuthPipeline::send`], which runs
//! this state machine:
//!
//! ```text
//! PENDING ──ok──────────────────────────────────────────────▶ SUCCESS
//!    │ other failure ───────────────────────────────────────▶ FAILED
//!    │ 401
//!    ▼
//! AUTH_FAILED ──▶ REFRESHING ──ok──▶ RETRY_PENDING ──ok─────▶ SUCCESS
//!                     │                    └─any failure────▶ FAILED
//!                     └─fails─▶ SESSION_CLEARED ────────────▶ FAILED
//! ```
//!
//! A request is replayed at most once. Concurrent 401s share one refresh:
//! the refresh gate is held while refreshing, and a caller that acquires it
//! after someone else already swapped the token replays with the new token
//! instead of refreshing again.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use taskdesk_core::error::AuthError;
use taskdesk_core::{AccessToken, Error, RefreshToken, Result};

use crate::http::endpoints::{ApiEnvelope, REFRESH, RefreshPayload};
use crate::http::{ApiClient, PendingRequest};
use crate::session::SessionStore;

/// Sends API requests with the session's credentials, refreshing an expired
/// access token once per request.
#[derive(Debug)]
pub struct AuthPipeline {
    http: ApiClient,
    session: Arc<SessionStore>,
    refresh_gate: Mutex<()>,
}

impl AuthPipeline {
    pub fn new(http: ApiClient, session: Arc<SessionStore>) -> Self {
        Self {
            http,
            session,
            refresh_gate: Mutex::new(()),
        }
    }

    /// The session this pipeline authenticates with.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// The underlying transport, for calls that must bypass session handling.
    pub fn http(&self) -> &ApiClient {
        &self.http
    }

    /// Send `request` with the current access token, refreshing and
    /// replaying once on an authentication failure.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn send<R>(&self, request: &PendingRequest) -> Result<ApiEnvelope<R>>
    where
        R: DeserializeOwned,
    {
        let sent_with = self.session.access_token().await;

        let original = match self.dispatch(request, sent_with.as_ref()).await {
            Err(err) if err.is_auth_failure() => err,
            outcome => return outcome,
        };

        debug!("Authentication failed; attempting recovery");
        let token = self.recover(sent_with, original).await?;

        debug!("Replaying request");
        self.dispatch(request, Some(&token)).await
    }

    async fn dispatch<R>(
        &self,
        request: &PendingRequest,
        token: Option<&AccessToken>,
    ) -> Result<ApiEnvelope<R>>
    where
        R: DeserializeOwned,
    {
        let authorization = token.map(AccessToken::bearer);
        self.http.execute(request, authorization.as_deref()).await
    }

    /// Obtain a token to replay with after `original` rejected `sent_with`.
    async fn recover(&self, sent_with: Option<AccessToken>, original: Error) -> Result<AccessToken> {
        let _gate = self.refresh_gate.lock().await;

        match (sent_with, self.session.access_token().await) {
            (sent, Some(current)) if sent.as_ref() != Some(&current) => {
                debug!("Token already refreshed by a concurrent request");
                return Ok(current);
            }
            (Some(_), None) => {
                debug!("Session ended while waiting for refresh");
                return Err(original);
            }
            _ => {}
        }

        match self.refresh_locked().await {
            Ok(token) => Ok(token),
            Err(Error::Auth(AuthError::NoRefreshToken)) => Err(original),
            Err(err) => Err(err),
        }
    }

    /// Refresh the access token now.
    ///
    /// Fails with [`AuthError::NoRefreshToken`] or
    /// [`AuthError::RefreshFailed`], clearing the session, if no new token
    /// can be obtained.
    pub async fn refresh(&self) -> Result<AccessToken> {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked().await
    }

    /// Must be called with the refresh gate held.
    #[instrument(skip(self))]
    async fn refresh_locked(&self) -> Result<AccessToken> {
        let Some(refresh_token) = self.session.refresh_token().await else {
            warn!("No refresh token available");
            self.session.expire().await;
            return Err(AuthError::NoRefreshToken.into());
        };

        info!("Refreshing access token");

        let token = match self.request_refresh(&refresh_token).await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "Token refresh failed");
                self.session.expire().await;
                return Err(AuthError::RefreshFailed {
                    source: Box::new(err),
                }
                .into());
            }
        };

        if self
            .session
            .replace_access_token(&refresh_token, token.clone())
            .await
        {
            debug!("Access token refreshed");
            return Ok(token);
        }

        // Logged out or logged in again while the refresh was in flight.
        self.session
            .access_token()
            .await
            .ok_or_else(|| AuthError::NotAuthenticated.into())
    }

    async fn request_refresh(&self, refresh_token: &RefreshToken) -> Result<AccessToken> {
        let request = PendingRequest::post(REFRESH, &serde_json::json!({}))?;
        let authorization = refresh_token.bearer();
        let payload: RefreshPayload = self
            .http
            .execute(&request, Some(&authorization))
            .await?
            .into_data()?;
        Ok(AccessToken::new(payload.access_token))
    }

    // ========================================================================
    // Convenience Methods
    // ========================================================================

    pub async fn get<R>(&self, path: &str) -> Result<ApiEnvelope<R>>
    where
        R: DeserializeOwned,
    {
        self.send(&PendingRequest::get(path)).await
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<ApiEnvelope<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(&PendingRequest::post(path, body)?).await
    }

    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<ApiEnvelope<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(&PendingRequest::put(path, body)?).await
    }

    pub async fn delete<R>(&self, path: &str) -> Result<ApiEnvelope<R>>
    where
        R: DeserializeOwned,
    {
        self.send(&PendingRequest::delete(path)).await
    }
}
