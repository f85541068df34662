//! JWT access-token generation and validation.
//!
//! Access tokens are HS256-signed JWTs containing a [`Claims`] payload. They
//! are stateless: validation never touches the database. Expiry is checked
//! against the caller-supplied `now` (from the injected clock) instead of the
//! library's wall-clock check, with no leeway.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use staybook_core::error::AuthError;
use staybook_core::roles::Role;
use staybook_core::types::{DbId, Timestamp};
use uuid::Uuid;

/// Value of the `type` claim on access tokens.
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// The user's role at issue time.
    pub role: Role,
    /// Token type discriminator; always [`ACCESS_TOKEN_TYPE`] for tokens we issue.
    #[serde(rename = "type")]
    pub token_type: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

/// Token signing and lifetime configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify access tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 1000).
    pub access_token_expiry_mins: i64,
    /// Refresh session lifetime in days (default: 14).
    pub refresh_token_expiry_days: i64,
    /// Server-held key for hashing refresh tokens before storage.
    pub refresh_token_pepper: String,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 1000;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 14;
/// Upper bound for `JWT_ACCESS_EXPIRY_MINS` (one year).
const MAX_ACCESS_EXPIRY_MINS: i64 = 60 * 24 * 365;
/// Upper bound for `JWT_REFRESH_EXPIRY_DAYS` (ten years).
const MAX_REFRESH_EXPIRY_DAYS: i64 = 3650;

impl JwtConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `REFRESH_TOKEN_PEPPER`     | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `1000`  |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `14`    |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or empty, or if an expiry is
    /// not an integer in `1..=max` (one year of minutes for access tokens, ten
    /// years of days for refresh sessions).
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let refresh_token_pepper = std::env::var("REFRESH_TOKEN_PEPPER")
            .expect("REFRESH_TOKEN_PEPPER must be set in the environment");
        assert!(
            !refresh_token_pepper.is_empty(),
            "REFRESH_TOKEN_PEPPER must not be empty"
        );

        let access_token_expiry_mins = parse_expiry(
            "JWT_ACCESS_EXPIRY_MINS",
            std::env::var("JWT_ACCESS_EXPIRY_MINS").ok(),
            DEFAULT_ACCESS_EXPIRY_MINS,
            MAX_ACCESS_EXPIRY_MINS,
        );
        let refresh_token_expiry_days = parse_expiry(
            "JWT_REFRESH_EXPIRY_DAYS",
            std::env::var("JWT_REFRESH_EXPIRY_DAYS").ok(),
            DEFAULT_REFRESH_EXPIRY_DAYS,
            MAX_REFRESH_EXPIRY_DAYS,
        );

        Self {
            secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
            refresh_token_pepper,
        }
    }

    /// Access token lifetime in seconds, as reported in `expires_in`.
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    /// Refresh session lifetime, used for `expires_at` and cookie `Max-Age`.
    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_token_expiry_days)
    }
}

/// Parse an expiry setting, falling back to `default` when unset.
///
/// # Panics
///
/// Panics if the value is not an integer in `1..=max`.
fn parse_expiry(name: &str, raw: Option<String>, default: i64, max: i64) -> i64 {
    let value = match raw {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .unwrap_or_else(|_| panic!("{name} must be a valid i64")),
        None => default,
    };
    assert!(
        (1..=max).contains(&value),
        "{name} must be between 1 and {max}, got {value}"
    );
    value
}

/// Generate an HS256 access token for the given user, issued at `now`.
pub fn generate_access_token(
    user_id: DbId,
    role: Role,
    config: &JwtConfig,
    now: Timestamp,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = now.timestamp();
    let claims = Claims {
        sub: user_id,
        role,
        token_type: ACCESS_TOKEN_TYPE.to_string(),
        exp: iat + config.access_token_ttl_secs(),
        iat,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token as of `now`.
///
/// - bad signature, malformed token, or wrong `type` → [`AuthError::TokenInvalid`]
/// - `now` past `exp` → [`AuthError::TokenExpired`]
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
    now: Timestamp,
) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthError::TokenInvalid)?
    .claims;

    if now.timestamp() > claims.exp {
        return Err(AuthError::TokenExpired);
    }
    if claims.token_type != ACCESS_TOKEN_TYPE {
        return Err(AuthError::TokenInvalid);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;

    /// Helper to build a test config with a known secret.
    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 14,
            refresh_token_pepper: "test-pepper".to_string(),
        }
    }

    fn sign(claims: &Claims, config: &JwtConfig) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("encoding should succeed")
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let config = test_config();
        let now = Utc::now();
        let token = generate_access_token(42, Role::Host, &config, now)
            .expect("token generation should succeed");

        let claims = validate_token(&token, &config, now).expect("token validation should succeed");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Host);
        assert_eq!(claims.token_type, ACCESS_TOKEN_TYPE);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_token_valid_until_exactly_exp() {
        let config = test_config();
        let now = Utc::now();
        let token = generate_access_token(1, Role::User, &config, now).unwrap();

        let at_expiry = now + Duration::minutes(15);
        assert!(validate_token(&token, &config, at_expiry).is_ok());

        let past_expiry = at_expiry + Duration::seconds(1);
        assert_matches!(
            validate_token(&token, &config, past_expiry),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn test_different_secrets_fail() {
        let config_a = test_config();
        let config_b = JwtConfig {
            secret: "secret-bravo".to_string(),
            ..test_config()
        };

        let now = Utc::now();
        let token = generate_access_token(1, Role::User, &config_a, now).unwrap();

        assert_matches!(
            validate_token(&token, &config_b, now),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn test_wrong_token_type_is_invalid() {
        let config = test_config();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 7,
            role: Role::User,
            token_type: "refresh".to_string(),
            exp: now + 300,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };

        let token = sign(&claims, &config);
        assert_matches!(
            validate_token(&token, &config, Utc::now()),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn test_garbage_is_invalid() {
        let config = test_config();
        assert_matches!(
            validate_token("not.a.jwt", &config, Utc::now()),
            Err(AuthError::TokenInvalid)
        );
        assert_matches!(
            validate_token("", &config, Utc::now()),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn test_refresh_ttl_helpers() {
        let config = test_config();
        assert_eq!(config.refresh_token_ttl(), Duration::days(14));
        assert_eq!(config.access_token_ttl_secs(), 900);
    }

    #[test]
    fn test_expiry_defaults_and_overrides() {
        assert_eq!(parse_expiry("X", None, 1000, MAX_ACCESS_EXPIRY_MINS), 1000);
        assert_eq!(parse_expiry("X", Some(" 30 ".into()), 1000, MAX_ACCESS_EXPIRY_MINS), 30);
        assert_eq!(
            parse_expiry("X", Some(MAX_REFRESH_EXPIRY_DAYS.to_string()), 14, MAX_REFRESH_EXPIRY_DAYS),
            MAX_REFRESH_EXPIRY_DAYS
        );
    }

    #[test]
    #[should_panic(expected = "JWT_ACCESS_EXPIRY_MINS must be between 1 and")]
    fn test_access_expiry_above_max_panics() {
        parse_expiry(
            "JWT_ACCESS_EXPIRY_MINS",
            Some("9223372036854775807".into()),
            DEFAULT_ACCESS_EXPIRY_MINS,
            MAX_ACCESS_EXPIRY_MINS,
        );
    }

    #[test]
    #[should_panic(expected = "JWT_REFRESH_EXPIRY_DAYS must be between 1 and")]
    fn test_refresh_expiry_above_max_panics() {
        parse_expiry(
            "JWT_REFRESH_EXPIRY_DAYS",
            Some("1000000000000".into()),
            DEFAULT_REFRESH_EXPIRY_DAYS,
            MAX_REFRESH_EXPIRY_DAYS,
        );
    }

    #[test]
    #[should_panic(expected = "JWT_REFRESH_EXPIRY_DAYS must be between 1 and")]
    fn test_zero_expiry_panics() {
        parse_expiry(
            "JWT_REFRESH_EXPIRY_DAYS",
            Some("0".into()),
            DEFAULT_REFRESH_EXPIRY_DAYS,
            MAX_REFRESH_EXPIRY_DAYS,
        );
    }

    #[test]
    fn test_max_expiries_do_not_overflow() {
        let config = JwtConfig {
            access_token_expiry_mins: MAX_ACCESS_EXPIRY_MINS,
            refresh_token_expiry_days: MAX_REFRESH_EXPIRY_DAYS,
            ..test_config()
        };
        let token = generate_access_token(1, Role::User, &config, Utc::now()).unwrap();
        assert!(!token.is_empty());
        assert_eq!(config.refresh_token_ttl(), Duration::days(MAX_REFRESH_EXPIRY_DAYS));
    }
}
