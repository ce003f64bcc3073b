//! Session store: the single source of truth for "who is the caller".
//!
//! Shared through `Arc` by the route gate and the API client. Every mutation
//! writes durable storage first; memory only changes once the write succeeded.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use jobboard_auth::{check_token, Capabilities, Identity, Role, Session, SessionError, TokenError};
use jobboard_core::{DomainError, DomainResult};

use crate::config::ClientConfig;
use crate::error::{backend_message, AuthError, StorageError};
use crate::storage::{SessionStorage, TOKEN_KEY, USER_KEY};

/// Self-registration payload.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl Registration {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role,
        }
    }

    /// Local checks mirroring the registration form. Admin accounts are
    /// provisioned by other admins, never self-registered.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if !self.email.contains('@') {
            return Err(DomainError::validation("email must be a valid address"));
        }
        if self.password.chars().count() < 6 {
            return Err(DomainError::validation("password must be at least 6 characters"));
        }
        if self.role == Role::Admin {
            return Err(DomainError::validation("admin accounts cannot be self-registered"));
        }
        Ok(())
    }
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Successful `/auth/*` response: `{ token, user }`, or the identity fields
/// inlined next to the token.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthGrant {
    Nested {
        token: String,
        user: Identity,
    },
    Flat {
        token: String,
        #[serde(flatten)]
        identity: Identity,
    },
}

impl AuthGrant {
    fn into_parts(self) -> (String, Identity) {
        match self {
            AuthGrant::Nested { token, user } => (token, user),
            AuthGrant::Flat { token, identity } => (token, identity),
        }
    }
}

#[derive(Debug, Error)]
enum RestoreRejected {
    #[error("stored identity is unreadable: {0}")]
    Identity(#[from] serde_json::Error),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub struct SessionStore {
    http: reqwest::Client,
    config: ClientConfig,
    storage: Arc<dyn SessionStorage>,
    state: RwLock<Session>,
    sign_in: Mutex<()>,
    restored: watch::Sender<bool>,
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore")
            .field("api_url", &self.config.api_url())
            .field("storage", &self.storage)
            .field("session", &*self.read_state())
            .field("restored", &self.is_restored())
            .finish()
    }
}

impl SessionStore {
    /// Create an empty, not-yet-restored store. Call [`SessionStore::restore`]
    /// once at startup.
    pub fn new(config: &ClientConfig, storage: Arc<dyn SessionStorage>) -> Self {
        let (restored, _) = watch::channel(false);
        Self {
            http: reqwest::Client::new(),
            config: config.clone(),
            storage,
            state: RwLock::new(Session::empty()),
            sign_in: Mutex::new(()),
            restored,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sign-in
    // ─────────────────────────────────────────────────────────────────────

    /// `POST /auth/login`. On failure the existing session is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let _in_flight = self.sign_in.try_lock().map_err(|_| AuthError::InFlight)?;

        debug!(email, "signing in");
        let grant = self
            .request_grant("/auth/login", &Credentials { email, password })
            .await?;
        self.activate(grant)
    }

    /// `POST /auth/register`, same contract as [`SessionStore::login`].
    pub async fn register(&self, registration: &Registration) -> Result<Identity, AuthError> {
        let _in_flight = self.sign_in.try_lock().map_err(|_| AuthError::InFlight)?;

        registration.validate()?;
        debug!(email = %registration.email, role = %registration.role, "registering");
        let grant = self.request_grant("/auth/register", registration).await?;
        self.activate(grant)
    }

    async fn request_grant<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthGrant, AuthError> {
        let resp = self
            .http
            .post(self.config.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = backend_message(status, &body);
            warn!(path, status = status.as_u16(), %message, "sign-in rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        resp.json::<AuthGrant>()
            .await
            .map_err(|e| AuthError::Decode(e.to_string()))
    }

    fn activate(&self, grant: AuthGrant) -> Result<Identity, AuthError> {
        let (token, identity) = grant.into_parts();
        let session = Session::established(token.as_str(), identity.clone())
            .map_err(|e| AuthError::Decode(e.to_string()))?;

        let user = serde_json::to_string(&identity).map_err(StorageError::from)?;
        {
            let mut state = self.write_state();
            self.storage
                .set_many(&[(TOKEN_KEY, token.as_str()), (USER_KEY, user.as_str())])?;
            *state = session;
        }
        self.restored.send_replace(true);

        info!(user_id = %identity.id, role = %identity.role, "signed in");
        Ok(identity)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sign-out
    // ─────────────────────────────────────────────────────────────────────

    /// Clear the session. Always succeeds; storage failures are only logged.
    pub fn logout(&self) {
        let mut state = self.write_state();
        self.discard_persisted();
        if core::mem::take(&mut *state).is_authenticated() {
            info!("signed out");
        }
    }

    /// Clear the session because the backend rejected `token`.
    ///
    /// Only the session that sent `token` is cleared; one established since
    /// then is kept. Returns whether a session was cleared.
    pub fn invalidate_token(&self, token: &str) -> bool {
        let mut state = self.write_state();
        if state.token() != Some(token) {
            debug!("rejected token is no longer current; session kept");
            return false;
        }
        self.discard_persisted();
        *state = Session::empty();
        warn!("backend rejected the session token; signed out");
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Restore
    // ─────────────────────────────────────────────────────────────────────

    /// Load the persisted session. Never fails: anything missing, partial,
    /// unreadable or expired yields an empty session and clears storage.
    pub fn restore(&self) -> Session {
        let session = {
            let mut state = self.write_state();
            *state = self.load_persisted();
            state.clone()
        };
        self.restored.send_replace(true);

        match session.identity() {
            Some(identity) => info!(user_id = %identity.id, role = %identity.role, "session restored"),
            None => debug!("no persisted session"),
        }
        session
    }

    fn load_persisted(&self) -> Session {
        let mut values = match self.storage.get_many(&[TOKEN_KEY, USER_KEY]) {
            Ok(values) => values.into_iter(),
            Err(e) => {
                warn!(error = %e, "persisted session unreadable; starting signed out");
                self.discard_persisted();
                return Session::empty();
            }
        };

        match (values.next().flatten(), values.next().flatten()) {
            (None, None) => Session::empty(),
            (Some(token), Some(user)) => match revive(&token, &user) {
                Ok(session) => session,
                Err(reason) => {
                    warn!(%reason, "discarding persisted session");
                    self.discard_persisted();
                    Session::empty()
                }
            },
            _ => {
                warn!("persisted session is partial; clearing");
                self.discard_persisted();
                Session::empty()
            }
        }
    }

    fn discard_persisted(&self) {
        if let Err(e) = self.storage.remove_many(&[TOKEN_KEY, USER_KEY]) {
            warn!(error = %e, "failed to clear persisted session");
        }
    }

    pub fn is_restored(&self) -> bool {
        *self.restored.borrow()
    }

    /// Resolve once [`SessionStore::restore`] (or a sign-in) has completed.
    pub async fn wait_restored(&self) {
        let mut rx = self.restored.subscribe();
        let _ = rx.wait_for(|done| *done).await;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn session(&self) -> Session {
        self.read_state().clone()
    }

    pub fn current_token(&self) -> Option<String> {
        self.read_state().token().map(str::to_string)
    }

    pub fn identity(&self) -> Option<Identity> {
        self.read_state().identity().cloned()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.read_state().capabilities()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn revive(token: &str, user: &str) -> Result<Session, RestoreRejected> {
    let identity: Identity = serde_json::from_str(user)?;
    check_token(token, Some(&identity.id), Utc::now())?;
    Ok(Session::established(token, identity)?)
}
