//! `fundlink seed` — populate the local store the host would normally own.

use anyhow::{bail, Result};
use fundlink_common::types::{Campaign, CampaignStatus, CartItem, UserProfile};
use fundlink_core::FundlinkDb;

/// `fundlink seed user <id> --email <email> --nicename <name>`
pub fn user(id: u64, email: &str, nicename: &str) -> Result<()> {
    if email.trim().is_empty() {
        bail!("Email must not be empty");
    }
    let db = FundlinkDb::open()?;
    db.upsert_user(&UserProfile {
        id,
        email: email.trim().to_string(),
        nicename: nicename.trim().to_string(),
    })?;
    println!("✓ User {id} ({email}) saved");
    Ok(())
}

/// `fundlink seed campaign <id> --author <user> [--status <status>]`
pub fn campaign(id: u64, author: u64, status: &str) -> Result<()> {
    let status = status
        .trim()
        .to_lowercase()
        .parse::<CampaignStatus>()
        .map_err(|e| anyhow::anyhow!("{e}. Use auto-draft, draft, pending or publish"))?;
    let db = FundlinkDb::open()?;
    db.upsert_campaign(&Campaign { id, author, status: status.clone() })?;
    println!("✓ Campaign {id} saved (owner {author}, {})", status.as_str());
    Ok(())
}

/// `fundlink seed payment <id> --items <campaign ids>`
pub fn payment(id: u64, items: &[u64]) -> Result<()> {
    let items: Vec<CartItem> = items.iter().map(|c| CartItem { id: *c }).collect();
    let db = FundlinkDb::open()?;
    let count = db.insert_payment_items(id, &items)?;
    println!("✓ Payment {id} saved with {count} line item(s)");
    Ok(())
}
