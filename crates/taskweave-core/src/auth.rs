//! Credential sources for the Google and Gemini adapters.
//!
//! Tokens are obtained outside this tool (any OAuth client will do) and
//! handed over either through an environment variable or the OS keyring.

use crate::error::AuthError;
use crate::ports::CredentialSource;

/// Environment variable holding a Google OAuth access token.
pub const GOOGLE_TOKEN_ENV: &str = "TASKWEAVE_GOOGLE_TOKEN";
/// Keyring entry holding a Google OAuth access token.
pub const GOOGLE_TOKEN_KEY: &str = "google_access_token";
/// Environment variable holding the Gemini API key.
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";
/// Keyring entry holding the Gemini API key.
pub const GEMINI_KEY_KEY: &str = "gemini_api_key";

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    use crate::error::AuthError;

    const SERVICE: &str = "taskweave";

    fn keyring_error(err: keyring::Error) -> AuthError {
        AuthError::Keyring(err.to_string())
    }

    pub fn get(key: &str) -> Result<Option<String>, AuthError> {
        let entry = keyring::Entry::new(SERVICE, key).map_err(keyring_error)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(keyring_error(e)),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), AuthError> {
        let entry = keyring::Entry::new(SERVICE, key).map_err(keyring_error)?;
        entry.set_password(value).map_err(keyring_error)
    }

    pub fn delete(key: &str) -> Result<(), AuthError> {
        let entry = keyring::Entry::new(SERVICE, key).map_err(keyring_error)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keyring_error(e)),
        }
    }
}

/// A fixed token.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl CredentialSource for StaticToken {
    fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

/// Where a secret was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretOrigin {
    Environment,
    Keyring,
}

/// A secret looked up first in an environment variable, then in the
/// keyring. Blank values count as absent.
#[derive(Debug, Clone)]
pub struct EnvOrKeyring {
    service: String,
    env_var: String,
    keyring_key: String,
}

impl EnvOrKeyring {
    pub fn new(service: &str, env_var: &str, keyring_key: &str) -> Self {
        Self {
            service: service.to_string(),
            env_var: env_var.to_string(),
            keyring_key: keyring_key.to_string(),
        }
    }

    pub fn google() -> Self {
        Self::new("Google", GOOGLE_TOKEN_ENV, GOOGLE_TOKEN_KEY)
    }

    pub fn gemini() -> Self {
        Self::new("Gemini", GEMINI_KEY_ENV, GEMINI_KEY_KEY)
    }

    /// The secret and where it came from, if any source has one.
    pub fn lookup(&self) -> Result<Option<(String, SecretOrigin)>, AuthError> {
        if let Some(value) = std::env::var(&self.env_var)
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            return Ok(Some((value, SecretOrigin::Environment)));
        }
        Ok(keyring_store::get(&self.keyring_key)?
            .filter(|v| !v.trim().is_empty())
            .map(|v| (v, SecretOrigin::Keyring)))
    }

    pub fn store(&self, value: &str) -> Result<(), AuthError> {
        keyring_store::set(&self.keyring_key, value)
    }

    pub fn clear(&self) -> Result<(), AuthError> {
        keyring_store::delete(&self.keyring_key)
    }
}

impl CredentialSource for EnvOrKeyring {
    fn access_token(&self) -> Result<String, AuthError> {
        self.lookup()?
            .map(|(value, _)| value)
            .ok_or_else(|| AuthError::CredentialsNotConfigured {
                service: self.service.clone(),
                env_var: self.env_var.clone(),
            })
    }
}
