//! Domain error types.
//!
//! [`AuthError`] is the authentication/authorization taxonomy. Every variant
//! carries a machine-stable [`code`](AuthError::code) that is surfaced to
//! clients verbatim, so renaming a code is a breaking API change.

/// Authentication and authorization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown email or wrong password at login.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Registration hit the unique constraint on `users.email`.
    #[error("Email already registered")]
    EmailAlreadyRegistered,

    /// No refresh token cookie or bearer token was presented.
    #[error("Missing token")]
    TokenMissing,

    #[error("Token expired")]
    TokenExpired,

    /// Bad signature, malformed structure, wrong token type, or unknown
    /// refresh token.
    #[error("Invalid token")]
    TokenInvalid,

    /// The refresh session was logged out or already rotated away.
    #[error("Token revoked")]
    TokenRevoked,

    /// The token subject no longer resolves to a user.
    #[error("User not found")]
    PrincipalNotFound,

    #[error("Forbidden")]
    Forbidden,
}

impl AuthError {
    /// Machine-stable reason string for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
            Self::TokenMissing => "TOKEN_MISSING",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::PrincipalNotFound => "PRINCIPAL_NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}
