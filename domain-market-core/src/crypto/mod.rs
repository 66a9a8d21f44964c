//! Password hashing module
//!
//! Admin passwords are stored as PBKDF2-HMAC-SHA256 hashes encoded as
//! `pbkdf2-sha256$<iterations>$<salt_b64>$<hash_b64>`. The iteration count
//! travels with the hash, so raising it only affects newly written hashes.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use pbkdf2::pbkdf2_hmac_array;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{CoreError, CoreResult};

/// PBKDF2-HMAC-SHA256 iterations (OWASP 2023 Recommended)
pub const DEFAULT_ITERATIONS: u32 = 600_000;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

/// Derive the hash bytes for `password`.
fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    pbkdf2_hmac_array::<Sha256, HASH_LENGTH>(password.as_bytes(), salt, iterations)
}

/// Hashes passwords with a fixed iteration count.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    /// Create a hasher. Zero iterations is clamped to one.
    #[must_use]
    pub const fn new(iterations: u32) -> Self {
        Self {
            iterations: if iterations == 0 { 1 } else { iterations },
        }
    }

    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash a password with a fresh random salt.
    #[must_use]
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LENGTH];
        rand::rng().fill_bytes(&mut salt);
        let hash = derive(password, &salt, self.iterations);
        format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            BASE64.encode(salt),
            BASE64.encode(hash)
        )
    }
}

/// Whether `stored` is an encoded hash rather than a legacy plain password.
#[must_use]
pub fn is_encoded_hash(stored: &str) -> bool {
    stored.starts_with(SCHEME) && stored.split('$').count() == 4
}

/// Verify `candidate` against an encoded hash in constant time.
///
/// # Returns
/// * `Ok(true)` / `Ok(false)` - comparison result
/// * `Err(_)` - `stored` is not a well-formed hash
pub fn verify(candidate: &str, stored: &str) -> CoreResult<bool> {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(CoreError::CredentialError("Unrecognized password hash format".to_string()));
    };

    let iterations: u32 = iterations
        .parse()
        .map_err(|e| CoreError::CredentialError(format!("Invalid iteration count: {e}")))?;
    let salt = BASE64
        .decode(salt)
        .map_err(|e| CoreError::CredentialError(format!("Invalid salt: {e}")))?;
    let expected = BASE64
        .decode(expected)
        .map_err(|e| CoreError::CredentialError(format!("Invalid hash: {e}")))?;

    let actual = derive(candidate, &salt, iterations);
    Ok(bool::from(actual.as_slice().ct_eq(expected.as_slice())))
}

/// Constant-time comparison for legacy plain-text values.
#[must_use]
pub fn legacy_matches(candidate: &str, stored: &str) -> bool {
    bool::from(candidate.as_bytes().ct_eq(stored.as_bytes()))
}
