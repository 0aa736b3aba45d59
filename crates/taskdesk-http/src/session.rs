//! Session state and its durable persistence.

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, instrument, warn};

use taskdesk_core::traits::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenStorage};
use taskdesk_core::{AccessToken, RefreshToken, Result, UserIdentity};

use crate::http::endpoints::PROFILE;
use crate::pipeline::AuthPipeline;

/// Session lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was established by login, registration, or startup.
    Established,
    /// The access token was replaced by a refresh.
    TokenRefreshed,
    /// The session was cleared.
    Cleared,
    /// Authentication failed irrecoverably; the user must log in again.
    LoginRequired,
}

/// A point-in-time view of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: Option<AccessToken>,
    pub refresh_token: Option<RefreshToken>,
    pub user: Option<UserIdentity>,
    /// True until startup restoration has finished.
    pub loading: bool,
    /// Last user-visible authentication error.
    pub error: Option<String>,
}

impl Session {
    /// True iff both an access token and a user identity are held.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.user.is_some()
    }
}

#[derive(Debug)]
struct SessionState {
    access_token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
    user: Option<UserIdentity>,
    loading: bool,
    error: Option<String>,
}

impl SessionState {
    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }

    fn reset(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.user = None;
        self.loading = false;
        self.error = None;
    }
}

/// Single source of truth for authentication state.
///
/// The store owns the token pair and the persisted copy of it. The request
/// pipeline reads tokens from here for every send and changes them only
/// through [`SessionStore::replace_access_token`] and
/// [`SessionStore::expire`].
///
/// None of the lifecycle operations fail for expected conditions such as a
/// missing token or a rejected profile fetch; callers inspect
/// [`SessionStore::snapshot`] instead.
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
    state: RwLock<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            storage,
            state: RwLock::new(SessionState {
                access_token: None,
                refresh_token: None,
                user: None,
                loading: true,
                error: None,
            }),
            events,
        }
    }

    /// Subscribe to session lifecycle notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: SessionEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    /// Restore the session from persisted tokens.
    ///
    /// Without a persisted access token this resolves immediately with no
    /// network traffic. Otherwise the current identity is fetched through
    /// `pipeline` (which may refresh the token on the way); any failure
    /// clears the persisted tokens. Always finishes with `loading == false`.
    #[instrument(skip_all)]
    pub async fn initialize(&self, pipeline: &AuthPipeline) -> Session {
        let access_token = self.read_persisted(ACCESS_TOKEN_KEY).await;

        let Some(access_token) = access_token else {
            debug!("No persisted session");
            self.state.write().await.loading = false;
            return self.snapshot().await;
        };

        let refresh_token = self.read_persisted(REFRESH_TOKEN_KEY).await;

        {
            let mut state = self.state.write().await;
            state.access_token = Some(AccessToken::new(access_token));
            state.refresh_token = refresh_token.map(RefreshToken::new);
            state.user = None;
        }

        let profile = match pipeline.get::<UserIdentity>(PROFILE).await {
            Ok(envelope) => envelope.into_data(),
            Err(err) => Err(err),
        };

        match profile {
            Ok(user) => {
                let mut state = self.state.write().await;
                // A failed refresh inside the pipeline may have cleared us.
                if state.access_token.is_some() {
                    info!(user_id = user.id, "Restored session");
                    state.user = Some(user);
                    state.loading = false;
                    drop(state);
                    self.notify(SessionEvent::Established);
                } else {
                    state.loading = false;
                }
            }
            Err(err) => {
                warn!(error = %err, "Could not restore session");
                self.clear().await;
            }
        }

        self.snapshot().await
    }

    async fn read_persisted(&self, key: &str) -> Option<String> {
        match self.storage.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(err) => {
                warn!(key, error = %err, "Failed to read persisted token");
                None
            }
        }
    }

    /// Persist both tokens and mark the session authenticated as `user`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the tokens could not be persisted; the
    /// in-memory session is left unchanged in that case.
    #[instrument(skip(self, access_token, refresh_token, user), fields(user_id = user.id))]
    pub async fn establish(
        &self,
        access_token: AccessToken,
        refresh_token: RefreshToken,
        user: UserIdentity,
    ) -> Result<()> {
        self.storage
            .set(ACCESS_TOKEN_KEY, access_token.as_str())
            .await?;
        self.storage
            .set(REFRESH_TOKEN_KEY, refresh_token.as_str())
            .await?;

        {
            let mut state = self.state.write().await;
            state.access_token = Some(access_token);
            state.refresh_token = Some(refresh_token);
            state.user = Some(user);
            state.loading = false;
            state.error = None;
        }

        info!("Session established");
        self.notify(SessionEvent::Established);
        Ok(())
    }

    /// Forget the session and its persisted tokens.
    pub async fn clear(&self) {
        self.remove_persisted(ACCESS_TOKEN_KEY).await;
        self.remove_persisted(REFRESH_TOKEN_KEY).await;

        let was_empty = {
            let mut state = self.state.write().await;
            let was_empty = state.is_empty();
            state.reset();
            was_empty
        };

        if !was_empty {
            info!("Session cleared");
            self.notify(SessionEvent::Cleared);
        }
    }

    async fn remove_persisted(&self, key: &str) {
        if let Err(err) = self.storage.remove(key).await {
            warn!(key, error = %err, "Failed to remove persisted token");
        }
    }

    /// Clear the session after an irrecoverable authentication failure and
    /// tell listeners to send the user back to login.
    pub(crate) async fn expire(&self) {
        self.clear().await;
        warn!("Session expired; login required");
        self.notify(SessionEvent::LoginRequired);
    }

    /// Replace the stored identity. Tokens are left alone.
    pub async fn update_identity(&self, user: UserIdentity) {
        debug!(user_id = user.id, "Updating identity");
        self.state.write().await.user = Some(user);
    }

    /// Install a refreshed access token, provided the session still holds
    /// `issued_for` as its refresh token.
    ///
    /// Returns false (and changes nothing) if the session was cleared or
    /// replaced while the refresh was in flight.
    pub async fn replace_access_token(
        &self,
        issued_for: &RefreshToken,
        access_token: AccessToken,
    ) -> bool {
        {
            let mut state = self.state.write().await;
            if state.refresh_token.as_ref() != Some(issued_for) {
                debug!("Discarding refreshed token for a session that no longer exists");
                return false;
            }
            state.access_token = Some(access_token.clone());
        }

        if let Err(err) = self
            .storage
            .set(ACCESS_TOKEN_KEY, access_token.as_str())
            .await
        {
            warn!(error = %err, "Failed to persist refreshed access token");
        }

        self.notify(SessionEvent::TokenRefreshed);
        true
    }

    pub(crate) async fn set_error(&self, message: Option<String>) {
        self.state.write().await.error = message;
    }

    pub async fn snapshot(&self) -> Session {
        let state = self.state.read().await;
        Session {
            access_token: state.access_token.clone(),
            refresh_token: state.refresh_token.clone(),
            user: state.user.clone(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    pub async fn access_token(&self) -> Option<AccessToken> {
        self.state.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<RefreshToken> {
        self.state.read().await.refresh_token.clone()
    }

    pub async fn user(&self) -> Option<UserIdentity> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        let state = self.state.read().await;
        state.access_token.is_some() && state.user.is_some()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn user(name: &str) -> UserIdentity {
        UserIdentity {
            id: 1,
            name: name.to_string(),
            email: "a@b.com".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn store() -> (Arc<MemoryStorage>, SessionStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        (storage, store)
    }

    #[tokio::test]
    async fn establish_persists_and_authenticates() {
        let (storage, store) = store();
        let mut events = store.subscribe();

        store
            .establish(AccessToken::new("T1"), RefreshToken::new("R1"), user("U"))
            .await
            .unwrap();

        let session = store.snapshot().await;
        assert!(session.is_authenticated());
        assert!(!session.loading);
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).await.unwrap().as_deref(), Some("T1"));
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).await.unwrap().as_deref(), Some("R1"));
        assert_eq!(events.try_recv().unwrap(), SessionEvent::Established);
    }

    #[tokio::test]
    async fn clear_twice_matches_clear_once() {
        let (storage, store) = store();
        store
            .establish(AccessToken::new("T1"), RefreshToken::new("R1"), user("U"))
            .await
            .unwrap();
        let mut events = store.subscribe();

        store.clear().await;
        let once = store.snapshot().await;
        store.clear().await;
        let twice = store.snapshot().await;

        assert_eq!(once, twice);
        assert!(!twice.is_authenticated());
        assert!(twice.access_token.is_none() && twice.refresh_token.is_none());
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(events.try_recv().unwrap(), SessionEvent::Cleared);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn update_identity_keeps_tokens() {
        let (_, store) = store();
        store
            .establish(AccessToken::new("T1"), RefreshToken::new("R1"), user("Old"))
            .await
            .unwrap();

        store.update_identity(user("New")).await;

        let session = store.snapshot().await;
        assert_eq!(session.user.unwrap().name, "New");
        assert_eq!(session.access_token, Some(AccessToken::new("T1")));
        assert_eq!(session.refresh_token, Some(RefreshToken::new("R1")));
    }

    #[tokio::test]
    async fn identity_without_token_is_not_authenticated() {
        let (_, store) = store();
        store.update_identity(user("Ghost")).await;
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn replace_access_token_requires_matching_refresh_token() {
        let (storage, store) = store();
        store
            .establish(AccessToken::new("T1"), RefreshToken::new("R1"), user("U"))
            .await
            .unwrap();

        assert!(
            !store
                .replace_access_token(&RefreshToken::new("other"), AccessToken::new("X"))
                .await
        );
        assert_eq!(store.access_token().await, Some(AccessToken::new("T1")));

        assert!(
            store
                .replace_access_token(&RefreshToken::new("R1"), AccessToken::new("T2"))
                .await
        );
        assert_eq!(store.access_token().await, Some(AccessToken::new("T2")));
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).await.unwrap().as_deref(), Some("T2"));
    }

    #[tokio::test]
    async fn stale_refresh_after_clear_is_discarded() {
        let (_, store) = store();
        store
            .establish(AccessToken::new("T1"), RefreshToken::new("R1"), user("U"))
            .await
            .unwrap();
        store.clear().await;

        assert!(
            !store
                .replace_access_token(&RefreshToken::new("R1"), AccessToken::new("T2"))
                .await
        );
        assert!(store.access_token().await.is_none());
    }

    #[tokio::test]
    async fn expire_signals_login_required() {
        let (_, store) = store();
        store
            .establish(AccessToken::new("T1"), RefreshToken::new("R1"), user("U"))
            .await
            .unwrap();
        let mut events = store.subscribe();

        store.expire().await;

        assert_eq!(events.try_recv().unwrap(), SessionEvent::Cleared);
        assert_eq!(events.try_recv().unwrap(), SessionEvent::LoginRequired);
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn starts_loading() {
        let (_, store) = store();
        assert!(store.is_loading().await);
        assert!(!store.is_authenticated().await);
    }
}
