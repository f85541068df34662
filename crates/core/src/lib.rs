//! Domain primitives shared by the Staybook database and API crates.
//!
//! This crate has no internal dependencies so it can be used by the
//! repository layer, the HTTP server, and any future CLI tooling alike.

pub mod clock;
pub mod error;
pub mod hashing;
pub mod roles;
pub mod types;
