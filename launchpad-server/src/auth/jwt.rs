//! JWT Token Service
//!
//! Handles JWT token generation, validation, and parsing for admin sessions.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::models::Club;

/// JWT Configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in minutes
    pub expiration_minutes: i64,
    /// Issuer
    pub issuer: String,
    /// Audience
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            #[cfg(debug_assertions)]
            {
                tracing::warn!(
                    "⚠️  JWT_SECRET not set! Using insecure default key. DO NOT USE IN PRODUCTION!"
                );
                "dev-secret-key-change-in-production-min-32-chars-long".to_string()
            }

            #[cfg(not(debug_assertions))]
            {
                panic!(
                    "🚨 FATAL: JWT_SECRET environment variable is not set! \
                     Production builds require a secure JWT secret."
                );
            }
        });

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440), // 24 hours default
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "launchpad-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "launchpad-admin".to_string()),
        }
    }
}

/// JWT Claims stored inside the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (admin record id)
    pub sub: String,
    /// Admin email
    pub email: String,
    /// Admin display name
    pub name: String,
    /// Club scope - every admin query is bound to this club
    pub club: Club,
    /// Expiration time (unix timestamp)
    pub exp: i64,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// JWT Error types
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT Service for token operations
#[derive(Debug, Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service with configuration from environment
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    /// Create a new JWT service with custom configuration
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a token for an authenticated admin
    pub fn generate_token(
        &self,
        admin_id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        club: Club,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: admin_id.into(),
            email: email.into(),
            name: name.into(),
            club,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate a token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    /// Extract the bearer token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// Current admin context, extracted from validated JWT claims
///
/// Injected into request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    /// Admin record id
    pub id: String,
    /// Admin email
    pub email: String,
    /// Admin display name
    pub name: String,
    /// Club this admin manages
    pub club: Club,
}

impl From<Claims> for CurrentAdmin {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            club: claims.club,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-key-for-unit-tests-only".to_string(),
            expiration_minutes: 60,
            issuer: "launchpad-server".to_string(),
            audience: "launchpad-admin".to_string(),
        })
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = test_service();

        let token = service
            .generate_token("admin:alpha", "lead@sosc.club", "Club Lead", Club::Sosc)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "admin:alpha");
        assert_eq!(claims.email, "lead@sosc.club");
        assert_eq!(claims.name, "Club Lead");
        assert_eq!(claims.club, Club::Sosc);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_club_claim_survives_round_trip() {
        let service = test_service();

        for club in Club::ALL {
            let token = service
                .generate_token("admin:beta", "a@b.c", "A", club)
                .unwrap();
            let current = CurrentAdmin::from(service.validate_token(&token).unwrap());
            assert_eq!(current.club, club);
        }
    }

    #[test]
    fn test_audience_mismatch_rejected() {
        let service = test_service();
        let other = JwtService::with_config(JwtConfig {
            secret: "test-secret-key-for-unit-tests-only".to_string(),
            expiration_minutes: 60,
            issuer: "launchpad-server".to_string(),
            audience: "another-audience".to_string(),
        });

        let token = service
            .generate_token("admin:gamma", "x@y.z", "X", Club::Src)
            .unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = test_service();
        let token = service
            .generate_token("admin:delta", "x@y.z", "X", Club::Challengers)
            .unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(service.validate_token(&tampered).is_err());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(
            JwtService::extract_from_header("Bearer abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
        assert_eq!(JwtService::extract_from_header("abc.def.ghi"), None);
    }
}
