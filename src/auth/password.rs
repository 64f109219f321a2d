use crate::config::DEFAULT_BCRYPT_COST;
use crate::error::AppError;
use bcrypt::{hash, verify};

/// The password hashing capability: bcrypt at a fixed work factor.
///
/// Both operations are CPU-bound; request handlers call them through
/// `web::block` so they never run on an async worker.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
    }

    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        verify(password, hashed_password)
            .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}
