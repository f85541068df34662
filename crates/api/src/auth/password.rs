//! Argon2id password hashing, verification, and rehash detection.
//!
//! All password hashes use the Argon2id variant with a cryptographically random
//! salt generated via [`OsRng`]. The PHC string format is used for storage so
//! that algorithm, version, cost parameters, and salt are embedded in the hash
//! itself. Verification reads those parameters back from the stored string, so
//! hashes produced under an older cost factor (or another Argon2 variant)
//! keep verifying after [`PasswordConfig`] changes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

/// Argon2id cost factors used for new hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordConfig {
    /// Load cost factors from environment variables.
    ///
    /// | Env Var               | Default  |
    /// |-----------------------|----------|
    /// | `ARGON2_MEMORY_KIB`   | `19456`  |
    /// | `ARGON2_ITERATIONS`   | `2`      |
    /// | `ARGON2_PARALLELISM`  | `1`      |
    ///
    /// # Panics
    ///
    /// Panics if a variable is set but is not a valid `u32`, or if the
    /// combination is rejected by Argon2.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |name: &str, default: u32| -> u32 {
            std::env::var(name)
                .map(|v| {
                    v.parse()
                        .unwrap_or_else(|_| panic!("{name} must be a valid u32"))
                })
                .unwrap_or(default)
        };

        let config = Self {
            memory_kib: read("ARGON2_MEMORY_KIB", defaults.memory_kib),
            iterations: read("ARGON2_ITERATIONS", defaults.iterations),
            parallelism: read("ARGON2_PARALLELISM", defaults.parallelism),
        };
        if let Err(e) = config.hasher() {
            panic!("Invalid Argon2 parameters: {e}");
        }
        config
    }

    fn hasher(&self) -> Result<Argon2<'static>, argon2::Error> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hash a plaintext password using Argon2id with a random salt.
///
/// Returns the PHC-formatted hash string (includes algorithm, params, salt, and hash).
pub fn hash_password(
    password: &str,
    config: &PasswordConfig,
) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = config.hasher()?.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted Argon2 hash.
///
/// Returns `Ok(true)` if the password matches, `Ok(false)` if it does not.
/// Only a malformed stored hash produces `Err`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Whether a stored hash was produced with a different variant, version, or
/// cost than `config` and should be replaced on the next successful login.
pub fn needs_rehash(
    hash: &str,
    config: &PasswordConfig,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    if parsed.algorithm != Algorithm::Argon2id.ident()
        || parsed.version != Some(Version::V0x13.into())
    {
        return Ok(true);
    }

    let params = Params::try_from(&parsed)?;
    Ok(params.m_cost() != config.memory_kib
        || params.t_cost() != config.iterations
        || params.p_cost() != config.parallelism)
}
