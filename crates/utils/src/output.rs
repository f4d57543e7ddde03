//! Unified output rendering: JSON or human-readable table.
//!
//! Usage:
//! ```ignore
//! use fundlink_utils::output::{OutputFormat, render};
//!
//! let data = LinkStatusOutput { ... };
//! render(format, &data)?;
//! ```

use anyhow::Result;
use serde::Serialize;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default).
    Table,
    /// Compact JSON (for piping to jq, scripts).
    Json,
    /// Pretty-printed JSON (for reading).
    JsonPretty,
}

/// Trait for types that can render as a human-readable table.
pub trait TableDisplay {
    fn print_table(&self);
}

/// Render structured output — JSON or table depending on format.
pub fn render<T: Serialize + TableDisplay>(format: OutputFormat, data: &T) -> Result<()> {
    match format {
        OutputFormat::Table => {
            data.print_table();
            Ok(())
        }
        OutputFormat::Json => {
            let json = serde_json::to_string(data)?;
            println!("{json}");
            Ok(())
        }
        OutputFormat::JsonPretty => {
            let json = serde_json::to_string_pretty(data)?;
            println!("{json}");
            Ok(())
        }
    }
}

/// Mask a secret for display, keeping the last four characters.
pub fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if len == 0 {
        return "—".into();
    }
    if len <= 4 {
        return "****".into();
    }
    let tail: String = secret.chars().skip(len - 4).collect();
    format!("****{tail}")
}

// ─── TableDisplay implementations for output types ──────────────────

use fundlink_types::output::*;

impl TableDisplay for ConfigOutput {
    fn print_table(&self) {
        let dash = "—";
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║  FUNDLINK CONFIG                                         ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║  Client ID    : {:<41}║", if self.client_id.is_empty() { dash } else { self.client_id.as_str() });
        println!("║  Client Secret: {:<41}║", self.client_secret);
        println!("║  Environment  : {:<41}║", self.environment);
        println!("║  Submit Page  : {:<41}║", self.submission_page);
        println!("║  Permalink    : {:<41}║", self.permalink);
        println!("║  Site Fee     : {:<41}║", self.app_fee_percent.as_deref().map(|p| format!("{p}%")).unwrap_or_else(|| "disabled".into()));
        println!("║  Verbose      : {:<41}║", self.verbose);
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

impl TableDisplay for AuthorizeUrlOutput {
    fn print_table(&self) {
        println!("Authorize on WePay ({}), returning to {}:", self.environment, self.return_url);
        println!("  {}", self.url);
    }
}

impl TableDisplay for LinkStatusOutput {
    fn print_table(&self) {
        if self.needs_linking {
            println!("✗ User {} has no linked WePay account.", self.user);
            if let Some(cta) = &self.call_to_action {
                println!();
                println!("{cta}");
            }
            return;
        }
        println!("✓ User {} is linked.", self.user);
        println!("  Account ID : {}", self.account_id.as_deref().unwrap_or("—"));
        println!("  Account URI: {}", self.account_uri.as_deref().unwrap_or("—"));
    }
}

impl TableDisplay for CallbackOutput {
    fn print_table(&self) {
        match self.status.as_str() {
            "linked" => println!(
                "✓ WePay account {} linked.",
                self.account_id.as_deref().unwrap_or("—")
            ),
            "failed" => println!(
                "✗ {}",
                self.message.as_deref().unwrap_or("WePay link failed.")
            ),
            _ => println!("Nothing to do: not a WePay callback for the submission page."),
        }
    }
}

impl TableDisplay for FeeOutput {
    fn print_table(&self) {
        match (&self.percent, &self.app_fee) {
            (Some(p), Some(fee)) => println!("Subtotal {} × {}% → app_fee {}", self.subtotal, p, fee),
            (Some(p), None) => println!("{}% of {} is out of range — app_fee omitted.", p, self.subtotal),
            _ => println!("No site fee configured — app_fee omitted."),
        }
    }
}

impl TableDisplay for CredentialsOutput {
    fn print_table(&self) {
        if !self.resolved {
            println!(
                "✗ Settlement target unresolved: {}",
                self.reason.as_deref().unwrap_or("unknown")
            );
            return;
        }
        println!("┌──────────────┬──────────────────────────────────────────┐");
        println!("│ Account ID   │ {:<40} │", self.account_id);
        println!("│ Access Token │ {:<40} │", self.access_token);
        println!("└──────────────┴──────────────────────────────────────────┘");
    }
}

impl TableDisplay for PayoutOutput {
    fn print_table(&self) {
        println!("Funds for campaign {} go to {}'s WePay account.", self.campaign, self.owner_email);
        println!("  Account ID  : {}", self.account_id);
        println!("  Access Token: {}", self.access_token);
        println!("  Account URI : {}", self.account_uri);
    }
}
