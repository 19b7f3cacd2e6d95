//! Password digests.

use sha2::{Digest as _, Sha256};

use base16::encode_lower;

/// Turns plaintext passwords into stored digests.
pub trait CredentialHasher: Send + Sync + 'static {
    /// Creates the digest of a plaintext password.
    ///
    /// The same input always produces the same digest.
    fn digest(&self, plaintext: &str) -> String;

    /// Checks a plaintext password against a stored digest.
    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        self.digest(plaintext) == digest
    }
}

/// A single round of SHA-256, optionally keyed.
///
/// There is no per-user salt and no work factor, so this is **not** a safe
/// way to store passwords. It only exists so existing databases keep
/// verifying; swap in a proper password hash behind [`CredentialHasher`].
#[derive(Clone, Debug, Default)]
pub struct Sha256Hasher {
    key: Option<String>,
}

impl Sha256Hasher {
    /// Creates a new `Sha256Hasher`.
    pub fn new(key: Option<String>) -> Sha256Hasher {
        Sha256Hasher { key }
    }
}

impl CredentialHasher for Sha256Hasher {
    fn digest(&self, plaintext: &str) -> String {
        let mut hasher = Sha256::new();

        if let Some(key) = self.key.as_ref() {
            hasher.update(key);
        }
        hasher.update(plaintext);

        let result = hasher.finalize();

        encode_lower(&result)
    }
}
