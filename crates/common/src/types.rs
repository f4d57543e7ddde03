//! Universal types shared across core, processor modules and the CLI.
//!
//! Processor modules convert their wire formats into these types; stores
//! read and write them. Nothing here knows about HTTP or SQL.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ACTION_CANCEL_PREAPPROVAL, ACTION_CHARGE_PREAPPROVAL, ACTION_PARAM, CODE_PARAM,
    PAYMENT_ID_PARAM,
};

pub type UserId = u64;
pub type PageId = u64;
pub type CampaignId = u64;
pub type PaymentId = u64;

/// Outbound payment request arguments handed to the gateway at checkout.
pub type CheckoutArgs = serde_json::Map<String, serde_json::Value>;

// ═══════════════════════════════════════════════════════════════════════
//  PROCESSOR
// ═══════════════════════════════════════════════════════════════════════

/// Processor environment, selected once from site-wide configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    pub fn from_sandbox_flag(sandbox: bool) -> Self {
        if sandbox {
            Environment::Sandbox
        } else {
            Environment::Production
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Sandbox => write!(f, "sandbox"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// OAuth2 permission scope requested from the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    ManageAccounts,
    CollectPayments,
    PreapprovePayments,
    SendMoney,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::ManageAccounts => "manage_accounts",
            Scope::CollectPayments => "collect_payments",
            Scope::PreapprovePayments => "preapprove_payments",
            Scope::SendMoney => "send_money",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed scope set every authorization request asks for.
pub const AUTHORIZATION_SCOPES: [Scope; 4] = [
    Scope::ManageAccounts,
    Scope::CollectPayments,
    Scope::PreapprovePayments,
    Scope::SendMoney,
];

/// Outbound authorization request. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub scopes: Vec<Scope>,
    /// Canonical address of the page the processor redirects back to.
    pub return_url: String,
}

impl AuthorizationRequest {
    pub fn new(return_url: impl Into<String>) -> Self {
        Self {
            scopes: AUTHORIZATION_SCOPES.to_vec(),
            return_url: return_url.into(),
        }
    }

    /// Scopes in the comma-joined form the processor expects.
    pub fn scope_param(&self) -> String {
        self.scopes
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Result of a successful authorization-code exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Merchant account returned by the processor's account-creation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAccount {
    pub account_id: String,
    pub account_uri: String,
}

// ═══════════════════════════════════════════════════════════════════════
//  USERS
// ═══════════════════════════════════════════════════════════════════════

/// Per-user processor link. All three fields are written together.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkedAccount {
    pub account_id: String,
    pub access_token: String,
    pub account_uri: String,
}

impl LinkedAccount {
    pub fn from_grant(grant: &TokenGrant, account: CreatedAccount) -> Self {
        Self {
            account_id: account.account_id,
            access_token: grant.access_token.clone(),
            account_uri: account.account_uri,
        }
    }

    /// A user counts as linked only once an account id is stored.
    pub fn is_linked(&self) -> bool {
        !self.account_id.trim().is_empty()
    }
}

impl std::fmt::Debug for LinkedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedAccount")
            .field("account_id", &self.account_id)
            .field("access_token", &"[REDACTED]")
            .field("account_uri", &self.account_uri)
            .finish()
    }
}

/// The current user as the host platform sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    /// URL-safe display name, sent to the processor as account description.
    pub nicename: String,
}

// ═══════════════════════════════════════════════════════════════════════
//  PAGES
// ═══════════════════════════════════════════════════════════════════════

/// One inbound page render, as handed over by the host.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page_id: PageId,
    /// Canonical address of the page (no query string).
    pub permalink: String,
    pub query: HashMap<String, String>,
    pub user: UserProfile,
}

impl PageRequest {
    /// Authorization code carried by a processor callback, if any.
    pub fn authorization_code(&self) -> Option<&str> {
        self.query
            .get(CODE_PARAM)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  CAMPAIGNS & CHECKOUT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CampaignStatus {
    AutoDraft,
    Draft,
    Pending,
    Publish,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::AutoDraft => "auto-draft",
            CampaignStatus::Draft => "draft",
            CampaignStatus::Pending => "pending",
            CampaignStatus::Publish => "publish",
        }
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto-draft" => Ok(CampaignStatus::AutoDraft),
            "draft" => Ok(CampaignStatus::Draft),
            "pending" => Ok(CampaignStatus::Pending),
            "publish" => Ok(CampaignStatus::Publish),
            other => Err(format!("unknown campaign status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    /// Owner — the user whose linked account receives the funds.
    pub author: UserId,
    pub status: CampaignStatus,
}

/// One line of a cart or stored payment. `id` is the campaign id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CampaignId,
}

/// Pending purchase kept in the session between checkout and gateway return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseSession {
    pub downloads: Vec<CartItem>,
}

/// Preapproval action requested through the checkout query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreapprovalAction {
    Charge,
    Cancel,
}

/// Everything settlement resolution may look at for one checkout event.
#[derive(Debug, Clone, Default)]
pub struct CheckoutContext {
    pub cart_items: Vec<CartItem>,
    pub session: Option<PurchaseSession>,
    pub payment_id: Option<PaymentId>,
    pub query: HashMap<String, String>,
}

impl CheckoutContext {
    /// Preapproval action + payment id named by the query string, if both
    /// are present and the payment id is a positive integer.
    pub fn preapproval_request(&self) -> Option<(PreapprovalAction, PaymentId)> {
        let action = match self.query.get(ACTION_PARAM).map(String::as_str) {
            Some(ACTION_CHARGE_PREAPPROVAL) => PreapprovalAction::Charge,
            Some(ACTION_CANCEL_PREAPPROVAL) => PreapprovalAction::Cancel,
            _ => return None,
        };
        let payment_id = self
            .query
            .get(PAYMENT_ID_PARAM)?
            .trim()
            .trim_start_matches('-')
            .parse::<PaymentId>()
            .ok()
            .filter(|id| *id > 0)?;
        Some((action, payment_id))
    }

    /// Session downloads, when a non-empty pending purchase exists.
    pub fn session_items(&self) -> Option<&[CartItem]> {
        self.session
            .as_ref()
            .map(|s| s.downloads.as_slice())
            .filter(|d| !d.is_empty())
    }
}

/// Credentials the gateway charges against.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutCredentials {
    pub access_token: String,
    pub account_id: String,
}

impl CheckoutCredentials {
    pub fn from_linked(account: &LinkedAccount) -> Self {
        Self {
            access_token: account.access_token.trim().to_string(),
            account_id: account.account_id.trim().to_string(),
        }
    }
}

impl std::fmt::Debug for CheckoutCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutCredentials")
            .field("access_token", &"[REDACTED]")
            .field("account_id", &self.account_id)
            .finish()
    }
}
