//! Client session: a bearer token paired with the identity it authorizes.

use thiserror::Error;

use crate::{Capabilities, Identity, Role};

/// Opaque bearer token.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session token is blank")]
    BlankToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Established {
    token: SessionToken,
    identity: Identity,
}

/// The current session.
///
/// Either empty or holding both a token and an identity; a token without an
/// identity (or the reverse) cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    inner: Option<Established>,
}

impl Session {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn established(token: impl Into<String>, identity: Identity) -> Result<Self, SessionError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SessionError::BlankToken);
        }
        Ok(Self {
            inner: Some(Established {
                token: SessionToken(token),
                identity,
            }),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.inner.as_ref().map(|e| e.token.as_str())
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.inner.as_ref().map(|e| &e.identity)
    }

    pub fn role(&self) -> Option<Role> {
        self.identity().map(|i| i.role)
    }

    /// Capabilities of the caller; none when logged out.
    pub fn capabilities(&self) -> Capabilities {
        self.role().map(Capabilities::for_role).unwrap_or_default()
    }
}
