//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row plus the create DTOs used for inserts.

pub mod session;
pub mod user;
