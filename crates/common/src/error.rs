//! Universal error types for fundlink.
//!
//! Every error carries a structured detail:
//! - **code**: machine-readable error code (e.g. `TOKEN_EXCHANGE_FAILED`)
//! - **category**: error class (`processor`, `checkout`, `config`, `network`, `system`)
//! - **recoverable**: whether retrying or reconfiguring can fix it
//! - **hints**: actionable suggestions for recovery
//!
//! JSON output format:
//! ```json
//! {
//!   "ok": false,
//!   "error": {
//!     "code": "ACCOUNT_CREATION_FAILED",
//!     "message": "WePay rejected account/create: invalid name",
//!     "category": "processor",
//!     "recoverable": true,
//!     "hints": ["Restart the WePay link from the submission page"]
//!   }
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// Error category — determines exit code and recovery strategy.
///
/// Exit codes:
/// - `0`: success
/// - `1`: user error (config, processor rejection, checkout)
/// - `2`: network error
/// - `3`: system error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Processor,
    Checkout,
    Config,
    Network,
    System,
}

impl ErrorCategory {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCategory::Processor => 1,
            ErrorCategory::Checkout => 1,
            ErrorCategory::Config => 1,
            ErrorCategory::Network => 2,
            ErrorCategory::System => 3,
        }
    }
}

/// Structured error detail for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub category: ErrorCategory,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

/// Top-level error type for all fundlink operations.
#[derive(Debug, Error)]
pub enum FundlinkError {
    // ── Processor ────────────────────────────────────────────────────
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Account creation failed: {0}")]
    AccountCreation(String),

    // ── Checkout ─────────────────────────────────────────────────────
    #[error("No settlement target: {0}")]
    UnresolvedSettlement(String),

    #[error("Site fee is misconfigured: {0}")]
    MisconfiguredFee(String),

    #[error("App fee overflow: {0}")]
    FeeOverflow(String),

    // ── Config ───────────────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Keyring error: {0}")]
    Keyring(String),

    // ── Network ─────────────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    // ── System ───────────────────────────────────────────────────────
    #[error("Template error: {0}")]
    Template(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("{0}")]
    Other(String),
}

impl FundlinkError {
    /// Get the structured error detail for JSON output.
    pub fn detail(&self) -> ErrorDetail {
        match self {
            FundlinkError::TokenExchange(msg) => ErrorDetail {
                code: "TOKEN_EXCHANGE_FAILED".into(),
                message: msg.clone(),
                category: ErrorCategory::Processor,
                recoverable: true,
                hints: vec![
                    "Authorization codes are single-use: restart the WePay link".into(),
                    "Check the client id and secret: fundlink configure show".into(),
                ],
            },
            FundlinkError::AccountCreation(msg) => ErrorDetail {
                code: "ACCOUNT_CREATION_FAILED".into(),
                message: msg.clone(),
                category: ErrorCategory::Processor,
                recoverable: true,
                hints: vec!["Restart the WePay link from the submission page".into()],
            },
            FundlinkError::UnresolvedSettlement(msg) => ErrorDetail {
                code: "UNRESOLVED_SETTLEMENT".into(),
                message: msg.clone(),
                category: ErrorCategory::Checkout,
                recoverable: false,
                hints: vec!["The campaign owner must link a WePay account first".into()],
            },
            FundlinkError::MisconfiguredFee(msg) => ErrorDetail {
                code: "MISCONFIGURED_FEE".into(),
                message: msg.clone(),
                category: ErrorCategory::Config,
                recoverable: true,
                hints: vec!["Run: fundlink configure fee <0-20>".into()],
            },
            FundlinkError::FeeOverflow(msg) => ErrorDetail {
                code: "FEE_OVERFLOW".into(),
                message: msg.clone(),
                category: ErrorCategory::Checkout,
                recoverable: false,
                hints: vec!["The app fee is omitted for this checkout".into()],
            },
            FundlinkError::InvalidConfig(msg) => ErrorDetail {
                code: "INVALID_CONFIG".into(),
                message: msg.clone(),
                category: ErrorCategory::Config,
                recoverable: true,
                hints: vec!["Check ~/.fundlink/config.toml or run: fundlink configure show".into()],
            },
            FundlinkError::Keyring(msg) => ErrorDetail {
                code: "KEYRING_ERROR".into(),
                message: msg.clone(),
                category: ErrorCategory::Config,
                recoverable: false,
                hints: vec![
                    "Check OS keyring service is running".into(),
                    "Or export FUNDLINK_CLIENT_SECRET".into(),
                ],
            },
            FundlinkError::Network(msg) => ErrorDetail {
                code: "NETWORK_ERROR".into(),
                message: msg.clone(),
                category: ErrorCategory::Network,
                recoverable: true,
                hints: vec!["Check network connectivity".into()],
            },
            FundlinkError::Template(msg) => ErrorDetail {
                code: "TEMPLATE_ERROR".into(),
                message: msg.clone(),
                category: ErrorCategory::System,
                recoverable: false,
                hints: vec![],
            },
            FundlinkError::Database(msg) => ErrorDetail {
                code: "DATABASE_ERROR".into(),
                message: msg.clone(),
                category: ErrorCategory::System,
                recoverable: false,
                hints: vec![],
            },
            FundlinkError::Other(msg) => ErrorDetail {
                code: "UNKNOWN_ERROR".into(),
                message: msg.clone(),
                category: ErrorCategory::System,
                recoverable: false,
                hints: vec![],
            },
        }
    }

    /// Exit code: 0 success, 1 user error, 2 network, 3 system.
    pub fn exit_code(&self) -> i32 {
        self.detail().category.exit_code()
    }

    /// Serialize this error as the JSON error envelope.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "ok": false,
            "error": self.detail(),
        })
    }

    /// Message safe to show to the end user whose action failed.
    pub fn user_message(&self) -> String {
        match self {
            FundlinkError::TokenExchange(_) | FundlinkError::Network(_) => {
                "We could not confirm your authorization with WePay. Please try linking your account again.".into()
            }
            FundlinkError::AccountCreation(_) => {
                "WePay authorized your login but the payment account could not be created. Please try again.".into()
            }
            _ => "Your WePay account could not be linked. Please contact the site administrator.".into(),
        }
    }
}

pub type FundlinkResult<T> = Result<T, FundlinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_token_exchange() {
        let err = FundlinkError::TokenExchange("invalid_grant".into());
        let detail = err.detail();
        assert_eq!(detail.code, "TOKEN_EXCHANGE_FAILED");
        assert_eq!(detail.category, ErrorCategory::Processor);
        assert!(detail.recoverable);
        assert!(!detail.hints.is_empty());
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(FundlinkError::AccountCreation("x".into()).exit_code(), 1);
        assert_eq!(FundlinkError::Network("timeout".into()).exit_code(), 2);
        assert_eq!(FundlinkError::Database("corrupt".into()).exit_code(), 3);
        assert_eq!(FundlinkError::MisconfiguredFee("abc".into()).exit_code(), 1);
        assert_eq!(FundlinkError::FeeOverflow("1e28".into()).exit_code(), 1);
        assert_eq!(FundlinkError::Template("call_to_action".into()).exit_code(), 3);
    }

    #[test]
    fn test_error_json_format() {
        let err = FundlinkError::UnresolvedSettlement("campaign 999999 not found".into());
        let json = err.to_json();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["code"], "UNRESOLVED_SETTLEMENT");
        assert_eq!(json["error"]["category"], "checkout");
        assert_eq!(json["error"]["recoverable"], false);
    }

    #[test]
    fn test_error_json_no_empty_hints() {
        let detail = FundlinkError::Database("locked".into()).detail();
        let serialized = serde_json::to_string(&detail).unwrap();
        assert!(!serialized.contains("\"hints\""));
    }

    #[test]
    fn test_user_message_hides_processor_detail() {
        let err = FundlinkError::TokenExchange("client_secret mismatch".into());
        let msg = err.user_message();
        assert!(!msg.contains("client_secret"));
        assert!(msg.contains("WePay"));
    }
}
