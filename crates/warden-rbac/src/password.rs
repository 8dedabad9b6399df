//! Argon2id implementation of the credential hashing collaborator.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use warden_core::credential::CredentialHasher;
use warden_core::error::WardenResult;

use crate::config::PasswordConfig;
use crate::error::CredentialError;

/// Hashes secrets with Argon2id and a fresh random salt per call.
///
/// If a pepper is configured it is prepended to the secret before hashing
/// and before verification.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
    pepper: Option<String>,
}

impl Argon2Hasher {
    pub fn new(config: &PasswordConfig) -> Result<Self, CredentialError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| CredentialError::Params(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            pepper: config.pepper.clone(),
        })
    }

    fn peppered(&self, secret: &str) -> String {
        match &self.pepper {
            Some(p) => format!("{p}{secret}"),
            None => secret.to_string(),
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> WardenResult<String> {
        let input = self.peppered(secret);
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(input.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;

        Ok(hash.to_string())
    }

    fn verify(&self, secret: &str, hash: &str) -> WardenResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| CredentialError::MalformedHash(e.to_string()))?;

        let input = self.peppered(secret);
        match self.argon2.verify_password(input.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::Hash(e.to_string()).into()),
        }
    }
}
