//! One-time codes
//!
//! Issues a 6-digit confirmation code, seals it for storage and verifies
//! candidates against the sealed form. The plaintext exists only between
//! `issue` and `dispatch`; it is never persisted and never logged.

pub mod delivery;

pub use delivery::{CodeDelivery, DeliveryError, TelegramDelivery};

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::transfer::error::TransferError;

/// Placeholder written to any log surface instead of a real code
pub const MASKED_CODE: &str = "******";

pub struct OtpIssuer {
    delivery: Arc<dyn CodeDelivery>,
}

impl OtpIssuer {
    /// The delivery sink (and with it the destination) is injected here;
    /// there is no default destination.
    pub fn new(delivery: Arc<dyn CodeDelivery>) -> Self {
        Self { delivery }
    }

    /// Uniform random code in [100000, 999999]
    pub fn issue(&self) -> String {
        let code: u32 = rand::thread_rng().gen_range(100_000..=999_999);
        code.to_string()
    }

    /// Salted one-way hash of the code (argon2, PHC string)
    pub fn seal(&self, code: &str) -> Result<String, TransferError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(code.as_bytes(), &salt)
            .map_err(|e| TransferError::Internal(format!("failed to seal code: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a candidate against a sealed code. Constant-time by
    /// construction; an unparseable stored hash verifies as false.
    pub fn verify(&self, candidate: &str, sealed: &str) -> bool {
        match PasswordHash::new(sealed) {
            Ok(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Hand the plaintext to the delivery sink on a spawned task.
    ///
    /// Fire-and-forget: a failed delivery is logged and never fails the
    /// transfer that triggered it.
    pub fn dispatch(&self, code: String, ext_id: String) {
        let delivery = Arc::clone(&self.delivery);
        tokio::spawn(async move {
            let text = format!("Your confirmation code: {}", code);
            match delivery.deliver(&text).await {
                Ok(()) => debug!(ext_id = %ext_id, code = MASKED_CODE, "OTP delivered"),
                Err(e) => {
                    warn!(ext_id = %ext_id, code = MASKED_CODE, error = %e, "OTP delivery failed")
                }
            }
        });
    }
}
