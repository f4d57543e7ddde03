//! Client-secret storage.
//!
//! The WePay client secret never touches `config.toml`: it lives in the OS
//! keyring under the `fundlink` service, and `FUNDLINK_CLIENT_SECRET`
//! overrides it when set (CI, containers without a keyring).

use anyhow::{bail, Context, Result};
use keyring::Entry;
use tracing::{debug, info};

/// Keyring service name.
const KEYRING_SERVICE: &str = "fundlink";

/// Keyring user entry holding the client secret.
const SECRET_ENTRY: &str = "wepay_client_secret";

/// Environment override for the client secret.
pub const SECRET_ENV: &str = "FUNDLINK_CLIENT_SECRET";

pub struct SecretStore;

impl SecretStore {
    /// Store the client secret in the OS keyring.
    pub fn store_client_secret(secret: &str) -> Result<()> {
        let secret = secret.trim();
        if secret.is_empty() {
            bail!("Client secret must not be empty");
        }
        let entry = Entry::new(KEYRING_SERVICE, SECRET_ENTRY)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(secret)
            .context("Failed to store client secret in OS keyring")?;
        info!("client secret stored in OS keyring");
        Ok(())
    }

    /// Resolve the client secret: environment first, then keyring.
    pub fn client_secret() -> Result<String> {
        if let Some(secret) = Self::from_env() {
            debug!("client secret taken from {SECRET_ENV}");
            return Ok(secret);
        }
        let entry = Entry::new(KEYRING_SERVICE, SECRET_ENTRY)
            .context("Failed to access keyring entry")?;
        let secret = entry.get_password().with_context(|| {
            format!("No client secret found. Run `fundlink configure secret` or set {SECRET_ENV}")
        })?;
        Ok(secret)
    }

    fn from_env() -> Option<String> {
        Self::non_empty(std::env::var(SECRET_ENV).ok())
    }

    fn non_empty(raw: Option<String>) -> Option<String> {
        raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
    }
}
