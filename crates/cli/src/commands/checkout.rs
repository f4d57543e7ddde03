//! `fundlink checkout` — exercise the checkout hooks.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use fundlink_common::constants::{ACTION_PARAM, APP_FEE_ARG, PAYMENT_ID_PARAM};
use fundlink_common::traits::PaymentDecorator;
use fundlink_common::types::{CartItem, CheckoutArgs, CheckoutContext, PurchaseSession};
use fundlink_types::config::AppConfig;
use fundlink_types::output::{CredentialsOutput, FeeOutput};
use fundlink_utils::output::{mask_secret, render, OutputFormat};

use crate::factory;

/// Flags of `fundlink checkout creds`.
#[derive(Debug, Default)]
pub struct CredsRequest {
    pub cart: Vec<u64>,
    pub session: Vec<u64>,
    pub payment: Option<u64>,
    pub action: Option<String>,
    pub action_payment: Option<String>,
}

impl CredsRequest {
    fn into_context(self) -> CheckoutContext {
        let mut query = HashMap::new();
        if let Some(action) = self.action {
            query.insert(ACTION_PARAM.to_string(), action);
        }
        if let Some(id) = self.action_payment {
            query.insert(PAYMENT_ID_PARAM.to_string(), id);
        }
        CheckoutContext {
            cart_items: items(&self.cart),
            session: (!self.session.is_empty()).then(|| PurchaseSession {
                downloads: items(&self.session),
            }),
            payment_id: self.payment,
            query,
        }
    }
}

fn items(ids: &[u64]) -> Vec<CartItem> {
    ids.iter().map(|id| CartItem { id: *id }).collect()
}

/// `fundlink checkout fee --subtotal <amount>`
pub fn fee(config: &AppConfig, subtotal: &str, fmt: OutputFormat) -> Result<()> {
    let subtotal = Decimal::from_str(subtotal.trim())
        .with_context(|| format!("Invalid subtotal '{subtotal}'"))?;
    let (bridge, _db) = factory::open_bridge(config)?;

    let mut args = CheckoutArgs::new();
    bridge.decorator().add_fee(&mut args, subtotal);

    let output = FeeOutput {
        subtotal: subtotal.to_string(),
        percent: bridge
            .checkout()
            .fee_config()
            .ok()
            .and_then(|c| c.percent_value())
            .map(|p| p.to_string()),
        app_fee: args.get(APP_FEE_ARG).map(|v| v.to_string()),
    };
    render(fmt, &output)
}

/// `fundlink checkout creds [...]`
pub fn creds(config: &AppConfig, request: CredsRequest, fmt: OutputFormat) -> Result<()> {
    let (bridge, _db) = factory::open_bridge(config)?;
    let ctx = request.into_context();

    let output = match bridge.checkout().resolve_settlement_credentials(&ctx) {
        Ok(creds) => CredentialsOutput {
            resolved: true,
            account_id: creds.account_id,
            access_token: mask_secret(&creds.access_token),
            reason: None,
        },
        Err(e) => CredentialsOutput {
            resolved: false,
            account_id: String::new(),
            access_token: String::new(),
            reason: Some(e.to_string()),
        },
    };
    render(fmt, &output)
}
