//! `fundlink link` — drive the account-link handshake from the shell.

use std::collections::HashMap;

use anyhow::{Context, Result};
use fundlink_common::constants::CODE_PARAM;
use fundlink_common::traits::{SubmissionGate, UserStore};
use fundlink_common::types::PageRequest;
use fundlink_core::HandshakeOutcome;
use fundlink_types::config::AppConfig;
use fundlink_types::output::{AuthorizeUrlOutput, CallbackOutput, LinkStatusOutput};
use fundlink_utils::output::{render, OutputFormat};
use tracing::warn;

use crate::factory;

/// `fundlink link url`
pub fn authorize_url(config: &AppConfig, fmt: OutputFormat) -> Result<()> {
    let (bridge, _db) = factory::open_bridge(config)?;
    let url = bridge
        .linker()
        .build_authorization_url(&config.site.permalink)?;

    let output = AuthorizeUrlOutput {
        environment: bridge.linker().environment().to_string(),
        return_url: config.site.permalink.clone(),
        url: url.to_string(),
    };
    render(fmt, &output)
}

/// `fundlink link callback --user <id> --page <id> --code <code>`
///
/// Replays the redirect WePay sends back to the submission page.
pub async fn callback(
    config: &AppConfig,
    user: u64,
    page: u64,
    code: &str,
    fmt: OutputFormat,
) -> Result<()> {
    let (bridge, db) = factory::open_bridge(config)?;
    let profile = db
        .profile(user)?
        .with_context(|| format!("Unknown user {user}. Add it with `fundlink seed user {user}`"))?;

    let request = PageRequest {
        page_id: page,
        permalink: config.site.permalink.clone(),
        query: HashMap::from([(CODE_PARAM.to_string(), code.to_string())]),
        user: profile,
    };

    let output = match bridge.linker().listen(&request).await {
        None => CallbackOutput {
            status: "ignored".into(),
            account_id: None,
            message: None,
        },
        Some(HandshakeOutcome::Linked(account)) => CallbackOutput {
            status: "linked".into(),
            account_id: Some(account.account_id),
            message: None,
        },
        Some(HandshakeOutcome::Failed { message, error }) => CallbackOutput {
            status: "failed".into(),
            account_id: None,
            message: Some(format!("{message} ({})", error.detail().code)),
        },
    };
    render(fmt, &output)
}

/// `fundlink link status --user <id>`
pub fn status(config: &AppConfig, user: u64, fmt: OutputFormat) -> Result<()> {
    let (bridge, db) = factory::open_bridge(config)?;
    let needs_linking = bridge.gate().needs_linking(user)?;

    let output = if needs_linking {
        let call_to_action = match bridge.gate().render_call_to_action() {
            Ok(html) => Some(html),
            Err(e) => {
                warn!(error = %e, "call to action unavailable");
                None
            }
        };
        LinkStatusOutput {
            user,
            needs_linking,
            account_id: None,
            account_uri: None,
            call_to_action,
        }
    } else {
        let account = db.linked_account(user)?.unwrap_or_default();
        LinkStatusOutput {
            user,
            needs_linking,
            account_id: Some(account.account_id),
            account_uri: Some(account.account_uri),
            call_to_action: None,
        }
    };
    render(fmt, &output)
}
