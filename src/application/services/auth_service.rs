//! Connection Authenticator
//!
//! Verifies the handshake credential (an HS256 JWT) and derives the
//! connection's identity from it.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::domain::Identity;
use crate::infrastructure::metrics;
use crate::shared::error::CollabError;

/// Role assumed when a token carries none
pub const DEFAULT_ROLE: &str = "member";

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject (user ID). Tokens minted by the REST layer carry it as `userId`.
    #[serde(alias = "userId")]
    pub sub: Subject,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub company_id: Option<i64>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
}

/// User id as found in the token, either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    Id(i64),
    Text(String),
}

impl Subject {
    fn user_id(&self) -> Option<i64> {
        match self {
            Subject::Id(id) => Some(*id),
            Subject::Text(text) => text.parse().ok(),
        }
    }
}

/// Why a handshake credential was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Missing,
    Expired,
    Invalid,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::Missing => "missing",
            Rejection::Expired => "expired",
            Rejection::Invalid => "invalid",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Rejection::Missing => "Authentication required",
            Rejection::Expired => "Token expired",
            Rejection::Invalid => "Invalid token",
        }
    }
}

/// Handshake credential verifier
#[derive(Clone)]
pub struct ConnectionAuthenticator {
    settings: JwtSettings,
}

impl ConnectionAuthenticator {
    pub fn new(settings: JwtSettings) -> Self {
        Self { settings }
    }

    /// Verify the credential presented at handshake time.
    ///
    /// Every failure is terminal for the handshake; nothing is retried.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Identity, CollabError> {
        self.verify(token).map_err(|rejection| {
            metrics::record_handshake_rejected(rejection.as_str());
            tracing::debug!(reason = rejection.as_str(), "Handshake rejected");
            CollabError::Authentication(rejection.message().to_string())
        })
    }

    /// Mint a token for a user. Used by tooling and tests; the REST layer
    /// issues production tokens with the same secret.
    pub fn issue_token(&self, identity: &Identity) -> Result<String, CollabError> {
        let now = Utc::now();
        let expiry = now + Duration::minutes(self.settings.access_token_expiry_minutes);

        let claims = Claims {
            sub: Subject::Text(identity.user_id.to_string()),
            role: Some(identity.role.clone()),
            company_id: identity.company_id,
            exp: expiry.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.secret.as_bytes()),
        )
        .map_err(|e| CollabError::Authentication(format!("Token generation failed: {}", e)))
    }

    fn verify(&self, token: Option<&str>) -> Result<Identity, Rejection> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(Rejection::Missing)?;

        let mut validation = Validation::default();
        validation.leeway = 0;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Rejection::Expired,
            _ => Rejection::Invalid,
        })?;

        let claims = token_data.claims;
        let user_id = claims.sub.user_id().ok_or(Rejection::Invalid)?;

        Ok(Identity::new(
            user_id,
            claims.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            claims.company_id,
        ))
    }
}
