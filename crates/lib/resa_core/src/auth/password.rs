//! Password hashing via bcrypt.

use super::AuthError;

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Lowest cost bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

/// Hashes and verifies passwords with a fixed bcrypt cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

impl PasswordHasher {
    /// Create a hasher with an explicit bcrypt cost.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// The bcrypt cost used for new hashes.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with bcrypt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
    }

    /// Verify a password against a bcrypt hash.
    ///
    /// A malformed hash verifies as `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}
