//! Which campaign owner's WePay account a checkout settles into.
//!
//! A purchase is attributed to the owner of the FIRST line item's campaign.
//! Carts mixing campaigns of different owners all settle to that one owner.

use std::sync::Arc;

use tracing::debug;

use fundlink_common::error::{FundlinkError, FundlinkResult};
use fundlink_common::traits::{CampaignStore, PaymentStore, UserStore};
use fundlink_common::types::*;

/// Where the line items of a checkout event were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSource {
    Cart,
    Session,
    Preapproval(PreapprovalAction),
    Payment,
}

pub struct SettlementResolver {
    campaigns: Arc<dyn CampaignStore>,
    payments: Arc<dyn PaymentStore>,
    users: Arc<dyn UserStore>,
}

impl SettlementResolver {
    pub fn new(
        campaigns: Arc<dyn CampaignStore>,
        payments: Arc<dyn PaymentStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            campaigns,
            payments,
            users,
        }
    }

    /// Line items for this event, first non-empty source wins:
    /// live cart, session purchase, preapproval action, payment id.
    pub fn line_items(&self, ctx: &CheckoutContext) -> FundlinkResult<Option<(ItemSource, Vec<CartItem>)>> {
        if !ctx.cart_items.is_empty() {
            return Ok(Some((ItemSource::Cart, ctx.cart_items.clone())));
        }
        if let Some(items) = ctx.session_items() {
            return Ok(Some((ItemSource::Session, items.to_vec())));
        }

        let stored = ctx
            .preapproval_request()
            .map(|(action, id)| (ItemSource::Preapproval(action), id))
            .or_else(|| {
                ctx.payment_id
                    .filter(|id| *id > 0)
                    .map(|id| (ItemSource::Payment, id))
            });

        if let Some((source, payment)) = stored {
            let items = self.payments.payment_items(payment)?;
            if !items.is_empty() {
                return Ok(Some((source, items)));
            }
            debug!(payment, "stored payment has no line items");
        }
        Ok(None)
    }

    /// Credentials of the first line item's campaign owner.
    ///
    /// Fails with `UnresolvedSettlement` when there are no items, the
    /// campaign does not exist, or its owner has not linked an account.
    pub fn resolve_settlement_credentials(&self, ctx: &CheckoutContext) -> FundlinkResult<CheckoutCredentials> {
        let (source, items) = self.line_items(ctx)?.ok_or_else(|| {
            FundlinkError::UnresolvedSettlement("checkout carries no line items".into())
        })?;
        let first = items.first().ok_or_else(|| {
            FundlinkError::UnresolvedSettlement("checkout carries no line items".into())
        })?;

        let campaign = self.campaigns.campaign(first.id)?.ok_or_else(|| {
            FundlinkError::UnresolvedSettlement(format!("campaign {} does not exist", first.id))
        })?;

        let account = self
            .users
            .linked_account(campaign.author)?
            .filter(LinkedAccount::is_linked)
            .ok_or_else(|| {
                FundlinkError::UnresolvedSettlement(format!(
                    "owner {} of campaign {} has no linked WePay account",
                    campaign.author, campaign.id
                ))
            })?;

        debug!(
            ?source,
            campaign = campaign.id,
            owner = campaign.author,
            "settlement target resolved"
        );
        Ok(CheckoutCredentials::from_linked(&account))
    }
}
