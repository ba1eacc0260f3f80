//! Credential hashing with bcrypt.
//!
//! Stored form is the modular-crypt bcrypt string (`$2b$<cost>$...`), which
//! carries its own salt and cost. Any other stored string is a legacy
//! plaintext credential awaiting migration.

use std::fmt;

use bcrypt::BcryptError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Work factor for newly hashed credentials.
pub const HASH_COST: u32 = 10;

const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];
const BCRYPT_LEN: usize = 60;

/// A user's stored credential.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// A bcrypt hash string.
    Hashed(String),
    /// Plaintext carried over from older state. Never accepted at login.
    Legacy(String),
}

impl Credential {
    /// Hash `secret` with a fresh salt at [`HASH_COST`].
    pub fn hash(secret: &str) -> Result<Self, BcryptError> {
        Self::hash_with_cost(secret, HASH_COST)
    }

    pub fn hash_with_cost(secret: &str, cost: u32) -> Result<Self, BcryptError> {
        bcrypt::hash(secret, cost).map(Credential::Hashed)
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Credential::Legacy(_))
    }

    /// Check `secret` against a hashed credential. Legacy credentials never verify.
    pub fn verify(&self, secret: &str) -> bool {
        match self {
            Credential::Hashed(hash) => bcrypt::verify(secret, hash).unwrap_or(false),
            Credential::Legacy(_) => false,
        }
    }

    /// Replace a legacy credential with its hashed form. Returns `true` if it
    /// changed. A hashing failure leaves the legacy value in place.
    pub fn upgrade(&mut self) -> bool {
        let Credential::Legacy(plain) = self else {
            return false;
        };
        match Credential::hash(plain) {
            Ok(hashed) => {
                *self = hashed;
                true
            }
            Err(e) => {
                tracing::warn!("could not hash legacy credential: {e}");
                false
            }
        }
    }

    fn encode(&self) -> &str {
        match self {
            Credential::Hashed(hash) => hash,
            Credential::Legacy(plain) => plain,
        }
    }

    fn decode(raw: &str) -> Self {
        let looks_hashed =
            raw.len() == BCRYPT_LEN && BCRYPT_PREFIXES.iter().any(|p| raw.starts_with(p));
        if looks_hashed {
            Credential::Hashed(raw.to_string())
        } else {
            Credential::Legacy(raw.to_string())
        }
    }
}

// Never print secrets or hashes.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Hashed(_) => f.write_str("Credential::Hashed(***)"),
            Credential::Legacy(_) => f.write_str("Credential::Legacy(***)"),
        }
    }
}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.encode())
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Credential::decode(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lowest cost bcrypt accepts; keeps the tests fast.
    fn quick(secret: &str) -> Credential {
        Credential::hash_with_cost(secret, 4).unwrap()
    }

    #[test]
    fn hashed_credential_verifies_only_the_right_secret() {
        let cred = quick("123456");
        assert!(cred.verify("123456"));
        assert!(!cred.verify("1234567"));
        assert!(!cred.verify(""));
    }

    #[test]
    fn same_secret_gets_distinct_salts() {
        assert_ne!(quick("pw"), quick("pw"));
    }

    #[test]
    fn default_cost_is_recorded_in_the_hash() {
        let cred = Credential::hash("pw").unwrap();
        let json = serde_json::to_string(&cred).unwrap();
        assert!(json.starts_with(&format!("\"$2b${HASH_COST}$")));
    }

    #[test]
    fn legacy_never_verifies_until_upgraded() {
        let mut cred: Credential = serde_json::from_str("\"123456\"").unwrap();
        assert!(cred.is_legacy());
        assert!(!cred.verify("123456"));

        assert!(cred.upgrade());
        assert!(!cred.upgrade());
        assert!(cred.verify("123456"));
    }

    #[test]
    fn stored_form_survives_serde() {
        let cred = quick("pw");
        let json = serde_json::to_string(&cred).unwrap();
        assert!(json.starts_with("\"$2b$04$"));
        let back: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cred);
        assert!(back.verify("pw"));
    }

    #[test]
    fn hashes_from_other_bcrypt_implementations_verify() {
        // Produced by libxcrypt for "123456".
        let stored = "\"$2b$10$NyXoIt.tQ0pPUI.RKPj0B.xPPNNdn6a.6RZlyje/pAZyfeyd.CUvm\"";
        let cred: Credential = serde_json::from_str(stored).unwrap();
        assert!(!cred.is_legacy());
        assert!(cred.verify("123456"));
    }

    #[test]
    fn malformed_hash_is_treated_as_legacy() {
        let cred: Credential = serde_json::from_str("\"$2b$10$short\"").unwrap();
        assert!(cred.is_legacy());
        let cred: Credential = serde_json::from_str("\"sha256$zz$00\"").unwrap();
        assert!(cred.is_legacy());
    }

    #[test]
    fn debug_hides_material() {
        let cred = Credential::Legacy("secret".into());
        assert!(!format!("{cred:?}").contains("secret"));
        let cred = quick("secret");
        assert!(!format!("{cred:?}").contains("$2b$"));
    }
}
