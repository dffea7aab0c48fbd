//! Credential verification
//!
//! Secrets are held only as salted SHA-256 digests and compared in constant
//! time. The encoded form used in configuration files is
//! `sha256$<salt-hex>$<digest-hex>`.

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::config::CredentialConfig;
use crate::error::{Error, Result};

/// Scheme tag at the front of an encoded digest
const DIGEST_SCHEME: &str = "sha256";

/// Length of a SHA-256 digest in bytes
const DIGEST_LEN: usize = 32;

/// Salt length used by [`SecretDigest::generate`]
const GENERATED_SALT_LEN: usize = 16;

/// A salted digest of a secret
#[derive(Clone, PartialEq, Eq)]
pub struct SecretDigest {
    salt: Vec<u8>,
    digest: [u8; DIGEST_LEN],
}

impl SecretDigest {
    /// Derive a digest for `secret` using the given salt
    pub fn derive(secret: &str, salt: &[u8]) -> Self {
        Self {
            salt: salt.to_vec(),
            digest: compute(salt, secret),
        }
    }

    /// Derive a digest for `secret` with a freshly generated random salt
    pub fn generate(secret: &str) -> Self {
        let salt = Uuid::new_v4();
        Self::derive(secret, &salt.as_bytes()[..GENERATED_SALT_LEN])
    }

    /// Parse an encoded `sha256$<salt>$<digest>` string.
    ///
    /// `field` names the configuration key for error reporting.
    pub fn parse(field: &str, encoded: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidCredentialDigest {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = encoded.trim().split('$');
        let (Some(scheme), Some(salt_hex), Some(digest_hex), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected 'sha256$<salt-hex>$<digest-hex>'"));
        };

        if scheme != DIGEST_SCHEME {
            return Err(invalid("unsupported digest scheme"));
        }

        let salt = hex::decode(salt_hex).map_err(|_| invalid("salt is not valid hex"))?;
        if salt.is_empty() {
            return Err(invalid("salt must not be empty"));
        }

        let digest_bytes =
            hex::decode(digest_hex).map_err(|_| invalid("digest is not valid hex"))?;
        if digest_bytes.len() != DIGEST_LEN {
            return Err(invalid("digest must be 32 bytes"));
        }

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&digest_bytes);
        Ok(Self { salt, digest })
    }

    /// Check a candidate secret against this digest in constant time
    pub fn verify(&self, candidate: &str) -> bool {
        let computed = compute(&self.salt, candidate);
        computed.ct_eq(&self.digest).into()
    }

    /// Encode as `sha256$<salt-hex>$<digest-hex>`
    pub fn encode(&self) -> String {
        format!(
            "{}${}${}",
            DIGEST_SCHEME,
            hex::encode(&self.salt),
            hex::encode(self.digest)
        )
    }
}

impl fmt::Debug for SecretDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDigest")
            .field("scheme", &DIGEST_SCHEME)
            .field("digest", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for SecretDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn compute(salt: &[u8], secret: &str) -> [u8; DIGEST_LEN] {
    let mut material = Zeroizing::new(Vec::with_capacity(salt.len() + secret.len()));
    material.extend_from_slice(salt);
    material.extend_from_slice(secret.as_bytes());

    let hash = Sha256::digest(material.as_slice());
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&hash);
    out
}

/// The fixed credentials an engine authenticates against
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: SecretDigest,
    passcode: SecretDigest,
}

impl Credentials {
    /// Build credentials from explicit parts
    pub fn new(username: impl Into<String>, password: SecretDigest, passcode: SecretDigest) -> Self {
        Self {
            username: username.into(),
            password,
            passcode,
        }
    }

    /// Build credentials from the `[credentials]` configuration section
    pub fn from_config(config: &CredentialConfig) -> Result<Self> {
        Ok(Self {
            username: config.username.clone(),
            password: SecretDigest::parse("credentials.password_digest", &config.password_digest)?,
            passcode: SecretDigest::parse("credentials.passcode_digest", &config.passcode_digest)?,
        })
    }

    /// Expected username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Verify a username/password pair.
    ///
    /// Both halves are always evaluated so a wrong username costs the same
    /// as a wrong password.
    pub fn verify_pair(&self, username: &str, password: &str) -> bool {
        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = subtle::Choice::from(u8::from(self.password.verify(password)));
        (user_ok & pass_ok).into()
    }

    /// Verify a single passcode
    pub fn verify_passcode(&self, passcode: &str) -> bool {
        self.passcode.verify(passcode)
    }
}
