//! Site fee ("app fee") taken on top of each contribution.

use std::str::FromStr;

use rust_decimal::Decimal;

use fundlink_common::constants::MAX_APP_FEE_PERCENT;
use fundlink_common::error::{FundlinkError, FundlinkResult};

/// `subtotal × fee_percent / 100`, exact. No rounding or clamping.
///
/// `None` when the product does not fit in a `Decimal`.
pub fn compute_app_fee(subtotal: Decimal, fee_percent: Decimal) -> Option<Decimal> {
    subtotal
        .checked_mul(fee_percent)?
        .checked_div(Decimal::ONE_HUNDRED)
}

/// Parsed site fee setting.
///
/// `percent == None` means no fee is configured and no `app_fee` argument
/// is sent at all. `Some(0)` is a configured zero fee and is sent as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppFeeConfig {
    percent: Option<Decimal>,
}

impl AppFeeConfig {
    pub fn disabled() -> Self {
        Self { percent: None }
    }

    pub fn percent(percent: Decimal) -> Self {
        Self {
            percent: Some(percent),
        }
    }

    /// Parse the raw setting as stored. Empty means disabled; a trailing
    /// `%` is accepted. Non-numeric values are a `MisconfiguredFee`.
    pub fn parse(raw: &str) -> FundlinkResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::disabled());
        }
        let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        let percent = Decimal::from_str(number).map_err(|_| {
            FundlinkError::MisconfiguredFee(format!("'{trimmed}' is not a number"))
        })?;
        Ok(Self::percent(percent))
    }

    /// Parse and range-check a value about to be saved. Accepts 0 to 20.
    pub fn validate_setting(raw: &str) -> FundlinkResult<Self> {
        let config = Self::parse(raw)?;
        if let Some(p) = config.percent {
            let max = Decimal::from(MAX_APP_FEE_PERCENT);
            if p < Decimal::ZERO || p > max {
                return Err(FundlinkError::MisconfiguredFee(format!(
                    "{p}% is outside the allowed range 0-{MAX_APP_FEE_PERCENT}%"
                )));
            }
        }
        Ok(config)
    }

    pub fn percent_value(&self) -> Option<Decimal> {
        self.percent
    }

    /// Fee for `subtotal`, or `None` when no fee is configured.
    pub fn fee_for(&self, subtotal: Decimal) -> FundlinkResult<Option<Decimal>> {
        let Some(p) = self.percent else {
            return Ok(None);
        };
        compute_app_fee(subtotal, p).map(Some).ok_or_else(|| {
            FundlinkError::FeeOverflow(format!("{p}% of {subtotal} is out of range"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_five_percent_of_two_hundred() {
        assert_eq!(compute_app_fee(d("200.00"), d("5")), Some(d("10.00")));
    }

    #[test]
    fn test_fee_is_exact() {
        assert_eq!(compute_app_fee(d("33.33"), d("7")), Some(d("2.3331")));
        assert_eq!(compute_app_fee(d("10"), d("2.5")), Some(d("0.25")));
    }

    #[test]
    fn test_fee_matches_formula_across_range() {
        for subtotal in ["0", "1", "19.99", "200.00", "12345.67"] {
            for p in 0..=MAX_APP_FEE_PERCENT {
                let s = d(subtotal);
                let pct = Decimal::from(p);
                assert_eq!(compute_app_fee(s, pct), Some(s * pct / Decimal::from(100)));
            }
        }
    }

    #[test]
    fn test_huge_subtotal_does_not_panic() {
        let subtotal = d("7922816251426433759354395033");
        assert_eq!(compute_app_fee(subtotal, d("20")), None);
        assert_eq!(compute_app_fee(subtotal, d("0")), Some(Decimal::ZERO));

        let err = AppFeeConfig::parse("20").unwrap().fee_for(subtotal).unwrap_err();
        assert!(matches!(err, FundlinkError::FeeOverflow(_)));
    }

    #[test]
    fn test_empty_setting_disables_fee() {
        let cfg = AppFeeConfig::parse("").unwrap();
        assert_eq!(cfg.percent_value(), None);
        assert_eq!(cfg.fee_for(d("200.00")).unwrap(), None);

        assert_eq!(AppFeeConfig::parse("   ").unwrap(), AppFeeConfig::disabled());
    }

    #[test]
    fn test_zero_setting_is_configured() {
        let cfg = AppFeeConfig::parse("0").unwrap();
        assert_eq!(cfg.percent_value(), Some(Decimal::ZERO));
        assert_eq!(cfg.fee_for(d("200.00")).unwrap(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_percent_sign_accepted() {
        assert_eq!(
            AppFeeConfig::parse(" 5% ").unwrap().percent_value(),
            Some(d("5"))
        );
    }

    #[test]
    fn test_non_numeric_is_misconfigured() {
        let err = AppFeeConfig::parse("five").unwrap_err();
        assert!(matches!(err, FundlinkError::MisconfiguredFee(_)));
    }

    #[test]
    fn test_validate_range() {
        assert!(AppFeeConfig::validate_setting("0").is_ok());
        assert!(AppFeeConfig::validate_setting("20").is_ok());
        assert!(AppFeeConfig::validate_setting("12.5").is_ok());
        assert!(AppFeeConfig::validate_setting("").is_ok());
        assert!(matches!(
            AppFeeConfig::validate_setting("25"),
            Err(FundlinkError::MisconfiguredFee(_))
        ));
        assert!(AppFeeConfig::validate_setting("-1").is_err());
    }

    #[test]
    fn test_parse_does_not_range_check() {
        // Out-of-range values already stored are applied as-is.
        assert_eq!(
            AppFeeConfig::parse("25").unwrap().fee_for(d("100")).unwrap(),
            Some(d("25"))
        );
    }
}
