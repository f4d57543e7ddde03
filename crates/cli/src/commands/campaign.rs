use anyhow::{bail, Result};
use fundlink_core::campaign::CampaignPayout;
use fundlink_types::config::AppConfig;
use fundlink_types::output::PayoutOutput;
use fundlink_utils::output::{mask_secret, render, OutputFormat};

use crate::factory;

/// `fundlink campaign payout <id>`
pub fn payout(config: &AppConfig, id: u64, fmt: OutputFormat) -> Result<()> {
    let (bridge, _db) = factory::open_bridge(config)?;
    let Some(payout) = bridge.campaign_payout(id)? else {
        bail!("Campaign {id} has no payout panel (missing or never saved)");
    };
    render(fmt, &payout_output(payout))
}

fn payout_output(payout: CampaignPayout) -> PayoutOutput {
    PayoutOutput {
        campaign: payout.campaign,
        owner_email: payout.owner_email,
        account_id: payout.account_id,
        access_token: mask_secret(&payout.access_token),
        account_uri: payout.account_uri,
    }
}
