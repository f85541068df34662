//! Credential primitives and the session lifecycle built on them.
//!
//! - [`password`] -- Argon2id hashing and verification.
//! - [`jwt`] -- HS256 access tokens.
//! - [`refresh`] -- opaque refresh tokens and their peppered hash.
//! - [`cookie`] -- refresh-token cookie transport.
//! - [`store`] -- the [`store::CredentialStore`] persistence seam.
//! - [`service`] -- [`service::SessionManager`], which ties them together.

pub mod cookie;
pub mod jwt;
pub mod password;
pub mod refresh;
pub mod service;
pub mod store;
