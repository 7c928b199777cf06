use crate::errors::AppError;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const BASIC_PREFIX: &str = "Basic ";

/// Proof of authorization for the current session.
///
/// This is the only shape ever persisted: a ready-to-send `Authorization`
/// header value plus the instant after which the client stops trusting it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    authorization: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Basic-Authentication credential valid for `ttl` from now. Fails when
    /// the expiry would fall outside the representable calendar.
    pub fn basic(username: &str, password: &str, ttl: Duration) -> Result<Self, AppError> {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Config(format!("session lifetime {} is out of range", ttl)))?;

        Ok(Self::basic_expiring_at(username, password, expires_at))
    }

    pub fn basic_expiring_at(username: &str, password: &str, expires_at: DateTime<Utc>) -> Self {
        let token = STANDARD.encode(format!("{}:{}", username, password));

        Self {
            authorization: format!("{}{}", BASIC_PREFIX, token),
            expires_at,
        }
    }

    /// Value for the `Authorization` request header.
    pub fn authorization_header(&self) -> &str {
        &self.authorization
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// A persisted record can be edited or truncated on disk; only a
    /// `Basic` header with a decodable `user:password` token is usable.
    pub fn is_well_formed(&self) -> bool {
        let Some(token) = self.authorization.strip_prefix(BASIC_PREFIX) else {
            return false;
        };

        STANDARD
            .decode(token)
            .ok()
            .and_then(|raw| String::from_utf8(raw).ok())
            .is_some_and(|pair| pair.contains(':'))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("authorization", &"Basic <redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
