//! Opaque bearer credential identifying a user.

use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

/// Request header carrying the credential.
pub const API_KEY_HEADER: &str = "ApiKey";

const API_KEY_BYTES: usize = 32;

/// A user's API key. Compared byte-for-byte; no normalisation.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Fresh key: 256 bits from the OS RNG, lowercase hex.
    pub fn generate() -> Self {
        let mut bytes = [0u8; API_KEY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn from_string(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keys must not end up in logs through `{:?}`.
impl core::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_64_hex_chars_and_distinct() {
        let a = ApiKey::generate();
        let b = ApiKey::generate();

        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = ApiKey::from_string("secret");
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
    }
}
