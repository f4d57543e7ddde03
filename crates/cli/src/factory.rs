//! Bridge factory — wires the WePay module and the local store.
//!
//! Lives in `cli` because `core` must not depend on processor modules.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use fundlink_common::types::Environment;
use fundlink_core::{Bridge, Collaborators, FundlinkDb, SecretStore};
use fundlink_mod_wepay::WePayClient;
use fundlink_types::config::AppConfig;

/// Open the local store and build a Bridge from config.
///
/// A missing client secret is not fatal: URLs and lookups still work and
/// the token exchange reports the missing secret.
pub fn open_bridge(config: &AppConfig) -> Result<(Bridge, Arc<FundlinkDb>)> {
    let secret = match SecretStore::client_secret() {
        Ok(secret) => secret,
        Err(e) => {
            warn!(error = %e, "no WePay client secret available");
            String::new()
        }
    };
    let db = Arc::new(FundlinkDb::open()?);
    let bridge = build_bridge(config, &secret, db.clone())?;
    Ok((bridge, db))
}

/// Build a Bridge over `db` with a WePay client for the configured
/// environment.
pub fn build_bridge(config: &AppConfig, client_secret: &str, db: Arc<FundlinkDb>) -> Result<Bridge> {
    let environment = Environment::from_sandbox_flag(config.processor.sandbox);
    let client = WePayClient::new(config.processor.client_id.clone(), client_secret, environment)?;
    info!(%environment, "WePay module loaded");
    Ok(Bridge::new(config, Collaborators::with_store(Arc::new(client), db)))
}
