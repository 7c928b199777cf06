use super::SessionStore;
use crate::{api::ApiClient, domain::Credential, errors::AppError};
use chrono::Duration;
use std::io::ErrorKind;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// What `restore_on_startup` found in the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restore {
    Restored,
    NoSession,
    Expired,
    /// Persisted state could not be read as a credential and was removed.
    Discarded,
}

impl Restore {
    pub fn state(self) -> SessionState {
        match self {
            Restore::Restored => SessionState::Authenticated,
            _ => SessionState::Unauthenticated,
        }
    }
}

/// Owns the one live credential, if any, and its persisted copy.
///
/// The in-memory credential and the stored one change together: either
/// both hold the same credential or both are empty.
pub struct SessionManager {
    store: Box<dyn SessionStore>,
    credential: Option<Credential>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Box<dyn SessionStore>, ttl: Duration) -> Self {
        Self {
            store,
            credential: None,
            ttl,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.credential.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    /// Probe the protected health endpoint with the given credentials and
    /// start a session only if the server answers healthy.
    pub fn login(
        &mut self,
        api: &ApiClient,
        username: &str,
        password: &str,
    ) -> Result<(), AppError> {
        if username.trim().is_empty() || password.is_empty() {
            self.discard();
            return Err(AppError::AuthenticationFailed);
        }

        let candidate = match Credential::basic(username, password, self.ttl) {
            Ok(candidate) => candidate,
            Err(e) => {
                self.discard();
                return Err(e);
            }
        };

        match api.health(&candidate) {
            Ok(report) if report.is_healthy() => {}
            Ok(report) => {
                info!(status = %report.status, "health probe answered but not healthy");
                self.discard();
                return Err(AppError::AuthenticationFailed);
            }
            Err(e) => {
                info!(error = %e, "login probe failed");
                self.discard();
                return Err(AppError::AuthenticationFailed);
            }
        }

        if let Err(e) = self.store.save(&candidate) {
            self.discard();
            return Err(e);
        }

        info!(expires_at = %candidate.expires_at, "session started");
        self.credential = Some(candidate);
        Ok(())
    }

    /// Forget the session. Safe to call when already logged out.
    pub fn logout(&mut self) -> Result<(), AppError> {
        self.credential = None;
        self.store.clear()?;
        info!("logged out");
        Ok(())
    }

    /// Same cleanup as `logout`, for when the server has rejected us. The
    /// in-memory credential is always dropped, even if the store fails.
    pub fn invalidate(&mut self) {
        self.credential = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear persisted session");
        }
        info!("session invalidated");
    }

    /// Pick up a session persisted by an earlier run. Stale or unreadable
    /// state is removed; calling this again afterwards changes nothing.
    pub fn restore_on_startup(&mut self) -> Result<Restore, AppError> {
        let loaded = match self.store.load() {
            Ok(loaded) => loaded,
            Err(AppError::Json(e)) => {
                warn!(error = %e, "persisted session is malformed");
                self.credential = None;
                self.store.clear()?;
                return Ok(Restore::Discarded);
            }
            Err(AppError::Io(e)) if e.kind() == ErrorKind::InvalidData => {
                warn!(error = %e, "persisted session is unreadable");
                self.credential = None;
                self.store.clear()?;
                return Ok(Restore::Discarded);
            }
            Err(e) => return Err(e),
        };

        let Some(credential) = loaded else {
            self.credential = None;
            return Ok(Restore::NoSession);
        };

        if !credential.is_well_formed() {
            warn!("persisted session is malformed");
            self.credential = None;
            self.store.clear()?;
            return Ok(Restore::Discarded);
        }

        if credential.is_expired() {
            info!(expired_at = %credential.expires_at, "persisted session expired");
            self.credential = None;
            self.store.clear()?;
            return Ok(Restore::Expired);
        }

        debug!(expires_at = %credential.expires_at, "session restored");
        self.credential = Some(credential);
        Ok(Restore::Restored)
    }

    fn discard(&mut self) {
        self.credential = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear persisted session");
        }
    }
}
