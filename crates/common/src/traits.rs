//! Collaborator traits — the seams between core and everything it consumes.
//!
//! Processor modules implement [`PaymentProcessor`]; the host platform (or
//! the bundled SQLite store) implements the store traits. Core exposes
//! [`SubmissionGate`] and [`PaymentDecorator`] back to the host, which
//! composes them explicitly at startup.

use async_trait::async_trait;
use rust_decimal::Decimal;
use url::Url;

use crate::error::FundlinkResult;
use crate::types::*;

/// OAuth2 + account API of a payment processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Environment this client was built for.
    fn environment(&self) -> Environment;

    /// Authorization page URL for `request`. No network call.
    fn authorization_url(&self, request: &AuthorizationRequest) -> FundlinkResult<Url>;

    /// Exchange an authorization code for an access token. One attempt.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> FundlinkResult<TokenGrant>;

    /// Create a merchant account authenticated with `access_token`.
    async fn create_account(
        &self,
        access_token: &str,
        name: &str,
        description: &str,
    ) -> FundlinkResult<CreatedAccount>;
}

/// User records and their processor link.
pub trait UserStore: Send + Sync {
    /// Stored link for `user`, if any field is present.
    fn linked_account(&self, user: UserId) -> FundlinkResult<Option<LinkedAccount>>;

    /// Write all three link fields, or none of them.
    fn save_linked_account(&self, user: UserId, account: &LinkedAccount) -> FundlinkResult<()>;

    fn profile(&self, user: UserId) -> FundlinkResult<Option<UserProfile>>;
}

pub trait CampaignStore: Send + Sync {
    fn campaign(&self, id: CampaignId) -> FundlinkResult<Option<Campaign>>;
}

pub trait PaymentStore: Send + Sync {
    /// Line items stored with a completed or preapproved payment.
    fn payment_items(&self, payment: PaymentId) -> FundlinkResult<Vec<CartItem>>;
}

/// Consumed by the campaign submission form renderer.
pub trait SubmissionGate: Send + Sync {
    /// Whether the submission form must be replaced by a call-to-action.
    fn needs_linking(&self, user: UserId) -> FundlinkResult<bool>;

    /// HTML call-to-action pointing at the processor's authorization page.
    fn render_call_to_action(&self) -> FundlinkResult<String>;
}

/// Consumed by the payment gateway when it builds a charge.
pub trait PaymentDecorator: Send + Sync {
    /// Add the site fee to outbound checkout arguments, if configured.
    fn add_fee(&self, args: &mut CheckoutArgs, subtotal: Decimal);

    /// Credentials that should receive settlement, falling back to `existing`.
    fn resolve_credentials(
        &self,
        existing: CheckoutCredentials,
        ctx: &CheckoutContext,
    ) -> CheckoutCredentials;
}
