//! Checkout hooks handed to the payment gateway.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use tracing::{debug, warn};

use fundlink_common::constants::APP_FEE_ARG;
use fundlink_common::error::{FundlinkError, FundlinkResult};
use fundlink_common::traits::PaymentDecorator;
use fundlink_common::types::*;

use crate::fee::AppFeeConfig;
use crate::settlement::SettlementResolver;

pub struct CheckoutDecorator {
    /// Raw site fee setting, parsed on use.
    fee_setting: String,
    resolver: SettlementResolver,
}

impl CheckoutDecorator {
    pub fn new(fee_setting: impl Into<String>, resolver: SettlementResolver) -> Self {
        Self {
            fee_setting: fee_setting.into(),
            resolver,
        }
    }

    pub fn fee_config(&self) -> FundlinkResult<AppFeeConfig> {
        AppFeeConfig::parse(&self.fee_setting)
    }

    pub fn resolver(&self) -> &SettlementResolver {
        &self.resolver
    }

    pub fn resolve_settlement_credentials(&self, ctx: &CheckoutContext) -> FundlinkResult<CheckoutCredentials> {
        self.resolver.resolve_settlement_credentials(ctx)
    }
}

impl PaymentDecorator for CheckoutDecorator {
    fn add_fee(&self, args: &mut CheckoutArgs, subtotal: Decimal) {
        let config = match self.fee_config() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "site fee ignored");
                return;
            }
        };
        let fee = match config.fee_for(subtotal) {
            Ok(Some(fee)) => fee,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "app fee skipped");
                return;
            }
        };
        match fee.to_f64().and_then(Number::from_f64) {
            Some(n) => {
                debug!(%subtotal, %fee, "app fee added");
                args.insert(APP_FEE_ARG.to_string(), Value::Number(n));
            }
            None => warn!(%fee, "app fee not representable, skipped"),
        }
    }

    fn resolve_credentials(&self, existing: CheckoutCredentials, ctx: &CheckoutContext) -> CheckoutCredentials {
        match self.resolver.resolve_settlement_credentials(ctx) {
            Ok(creds) => creds,
            Err(FundlinkError::UnresolvedSettlement(reason)) => {
                debug!(%reason, "settlement unresolved, keeping gateway credentials");
                existing
            }
            Err(e) => {
                warn!(error = %e, "settlement lookup failed, keeping gateway credentials");
                existing
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::testing::*;

    fn decorator(fee: &str) -> CheckoutDecorator {
        let db = seeded_db();
        CheckoutDecorator::new(fee, SettlementResolver::new(db.clone(), db.clone(), db))
    }

    fn gateway_default() -> CheckoutCredentials {
        CheckoutCredentials {
            access_token: "site_tok".into(),
            account_id: "site_acc".into(),
        }
    }

    fn args() -> CheckoutArgs {
        let mut args = CheckoutArgs::new();
        args.insert("amount".into(), json!(200.0));
        args
    }

    #[test]
    fn test_fee_added() {
        let mut args = args();
        decorator("5").add_fee(&mut args, Decimal::from_str("200.00").unwrap());
        assert_eq!(args[APP_FEE_ARG], json!(10.0));
        assert_eq!(args["amount"], json!(200.0));
    }

    #[test]
    fn test_empty_setting_adds_nothing() {
        let mut args = args();
        decorator("").add_fee(&mut args, Decimal::from(200));
        assert!(!args.contains_key(APP_FEE_ARG));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_zero_setting_adds_zero() {
        let mut args = args();
        decorator("0").add_fee(&mut args, Decimal::from(200));
        assert_eq!(args[APP_FEE_ARG], json!(0.0));
    }

    #[test]
    fn test_misconfigured_fee_is_skipped() {
        let mut args = args();
        decorator("lots").add_fee(&mut args, Decimal::from(200));
        assert!(!args.contains_key(APP_FEE_ARG));
    }

    #[test]
    fn test_overflowing_fee_is_skipped() {
        let mut args = args();
        let subtotal = Decimal::from_str("7922816251426433759354395033").unwrap();
        decorator("20").add_fee(&mut args, subtotal);
        assert!(!args.contains_key(APP_FEE_ARG));
        assert_eq!(args["amount"], json!(200.0));
    }

    #[test]
    fn test_resolved_credentials_replace_existing() {
        let ctx = CheckoutContext {
            cart_items: vec![CartItem { id: 12 }],
            ..Default::default()
        };
        let creds = decorator("").resolve_credentials(gateway_default(), &ctx);
        assert_eq!(creds.account_id, "acc_1");
        assert_eq!(creds.access_token, "tok_1");
    }

    #[test]
    fn test_unresolved_passes_existing_through() {
        let ctx = CheckoutContext {
            cart_items: vec![CartItem { id: 999999 }],
            ..Default::default()
        };
        let creds = decorator("").resolve_credentials(gateway_default(), &ctx);
        assert_eq!(creds, gateway_default());

        let creds = decorator("").resolve_credentials(gateway_default(), &CheckoutContext::default());
        assert_eq!(creds, gateway_default());
    }

    #[test]
    fn test_store_error_passes_existing_through() {
        let db = seeded_db();
        let resolver = SettlementResolver::new(db.clone(), db, Arc::new(ReadOnlyUsers {
            fail_reads: true,
            ..Default::default()
        }));
        let decorator = CheckoutDecorator::new("", resolver);

        let ctx = CheckoutContext {
            cart_items: vec![CartItem { id: 12 }],
            ..Default::default()
        };
        assert_eq!(decorator.resolve_credentials(gateway_default(), &ctx), gateway_default());
    }
}
