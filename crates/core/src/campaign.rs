//! Campaign-side uses of a linked account: the persisted metadata
//! whitelist, the hidden fields on the submission form, and the payout
//! panel on the campaign admin screen.

use serde::Serialize;

use fundlink_common::constants::{META_ACCESS_TOKEN, META_ACCOUNT_ID};
use fundlink_common::error::FundlinkResult;
use fundlink_common::traits::{CampaignStore, UserStore};
use fundlink_common::types::*;

/// Values the submission form embeds for a linked user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionFields {
    pub account_uri: String,
    pub account_id: String,
    pub access_token: String,
}

/// Payout panel data for one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignPayout {
    pub campaign: CampaignId,
    pub owner: UserId,
    pub owner_email: String,
    pub account_id: String,
    pub access_token: String,
    pub account_uri: String,
}

/// Add the link keys to the campaign metadata whitelist.
pub fn campaign_meta_keys(mut existing: Vec<String>) -> Vec<String> {
    for key in [META_ACCOUNT_ID, META_ACCESS_TOKEN] {
        if !existing.iter().any(|k| k == key) {
            existing.push(key.to_string());
        }
    }
    existing
}

pub fn submission_fields(users: &dyn UserStore, user: UserId) -> FundlinkResult<Option<SubmissionFields>> {
    let fields = users
        .linked_account(user)?
        .filter(LinkedAccount::is_linked)
        .map(|a| SubmissionFields {
            account_uri: a.account_uri,
            account_id: a.account_id,
            access_token: a.access_token,
        });
    Ok(fields)
}

/// Payout data, or `None` for missing and auto-draft campaigns. An owner
/// without a link still gets a panel, with empty account values.
pub fn campaign_payout(
    campaigns: &dyn CampaignStore,
    users: &dyn UserStore,
    campaign_id: CampaignId,
) -> FundlinkResult<Option<CampaignPayout>> {
    let Some(campaign) = campaigns.campaign(campaign_id)? else {
        return Ok(None);
    };
    if campaign.status == CampaignStatus::AutoDraft {
        return Ok(None);
    }

    let owner_email = users
        .profile(campaign.author)?
        .map(|p| p.email)
        .unwrap_or_default();
    let account = users.linked_account(campaign.author)?.unwrap_or_default();

    Ok(Some(CampaignPayout {
        campaign: campaign.id,
        owner: campaign.author,
        owner_email,
        account_id: account.account_id,
        access_token: account.access_token,
        account_uri: account.account_uri,
    }))
}
