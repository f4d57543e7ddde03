//! Structured output types for JSON/table rendering.
//!
//! Every data-producing command returns one of these types.
//! They all derive `Serialize` for JSON output, and implement
//! `TableDisplay` (in fundlink-utils) for human-readable rendering.

use serde::Serialize;

// ─── Config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ConfigOutput {
    pub client_id: String,
    pub client_secret: String,
    pub environment: String,
    pub submission_page: u64,
    pub permalink: String,
    pub app_fee_percent: Option<String>,
    pub verbose: bool,
}

// ─── Link ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeUrlOutput {
    pub environment: String,
    pub return_url: String,
    pub url: String,
}

/// Link state of one user.
///
/// ```json
/// {
///   "user": 7,
///   "needs_linking": false,
///   "account_id": "acc_1",
///   "account_uri": "https://wepay.test/acc_1"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct LinkStatusOutput {
    pub user: u64,
    pub needs_linking: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<String>,
}

/// Result of one callback page render.
#[derive(Debug, Clone, Serialize)]
pub struct CallbackOutput {
    /// `ignored`, `linked` or `failed`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ─── Checkout ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct FeeOutput {
    pub subtotal: String,
    pub percent: Option<String>,
    /// `None` when no site fee is configured (no `app_fee` key is sent).
    pub app_fee: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CredentialsOutput {
    pub resolved: bool,
    pub account_id: String,
    /// Access tokens are only ever shown masked.
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ─── Campaign ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PayoutOutput {
    pub campaign: u64,
    pub owner_email: String,
    pub account_id: String,
    /// Masked, like every access token the CLI prints.
    pub access_token: String,
    pub account_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_status_skips_missing_fields() {
        let output = LinkStatusOutput {
            user: 7,
            needs_linking: true,
            account_id: None,
            account_uri: None,
            call_to_action: Some("<p>...</p>".into()),
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"needs_linking\":true"));
        assert!(!json.contains("account_id"));
        assert!(json.contains("call_to_action"));
    }

    #[test]
    fn test_fee_output_serializes_null_fee() {
        let output = FeeOutput {
            subtotal: "200.00".into(),
            percent: None,
            app_fee: None,
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"app_fee\":null"));
    }

    #[test]
    fn test_callback_output_serializes() {
        let output = CallbackOutput {
            status: "linked".into(),
            account_id: Some("acc_1".into()),
            message: None,
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"status\":\"linked\""));
        assert!(json.contains("\"account_id\":\"acc_1\""));
        assert!(!json.contains("message"));
    }
}
