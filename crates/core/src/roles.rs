//! User roles and the role-based authorization gate.
//!
//! Role names are stored as `TEXT` in `users.role` and must match the
//! `CHECK` constraint in `20260101000001_create_users_table.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, CoreError};

pub const ROLE_USER: &str = "USER";
pub const ROLE_HOST: &str = "HOST";
pub const ROLE_ADMIN: &str = "ADMIN";

/// The closed set of roles a user can hold.
///
/// [`Role::Admin`] is an implicit superuser: it passes every policy
/// regardless of the declared allow-set (see [`is_allowed`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Host,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Host => ROLE_HOST,
            Role::Admin => ROLE_ADMIN,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(Role::User),
            ROLE_HOST => Ok(Role::Host),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Whether `role` may perform an operation declared for `allowed`.
///
/// This is the only place the admin bypass is encoded.
pub fn is_allowed(role: Role, allowed: &[Role]) -> bool {
    role == Role::Admin || allowed.contains(&role)
}

/// Authorization gate: `Ok(())` when [`is_allowed`], otherwise
/// [`AuthError::Forbidden`].
pub fn authorize(role: Role, allowed: &[Role]) -> Result<(), AuthError> {
    if is_allowed(role, allowed) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}
