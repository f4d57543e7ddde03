use anyhow::{bail, Result};
use fundlink_common::types::Environment;
use fundlink_core::fee::AppFeeConfig;
use fundlink_core::SecretStore;
use fundlink_types::output::ConfigOutput;
use fundlink_utils::output::{mask_secret, render, OutputFormat};
use url::Url;

/// `fundlink configure show` — display current config.
pub fn run(fmt: OutputFormat) -> Result<()> {
    let config = fundlink_core::workspace::load_config()?;

    let output = ConfigOutput {
        client_id: config.processor.client_id.clone(),
        client_secret: SecretStore::client_secret()
            .map(|s| mask_secret(&s))
            .unwrap_or_else(|_| "not set".into()),
        environment: Environment::from_sandbox_flag(config.processor.sandbox).to_string(),
        submission_page: config.site.submission_page,
        permalink: config.site.permalink.clone(),
        app_fee_percent: Some(config.site.app_fee_percent.trim().to_string()).filter(|p| !p.is_empty()),
        verbose: config.system.verbose,
    };

    render(fmt, &output)?;

    if fmt == OutputFormat::Table {
        println!();
        println!("Tip: Edit settings with `fundlink configure <setting> <value>`.");
    }

    Ok(())
}

/// `fundlink configure client-id <id>`
pub fn set_client_id(id: &str) -> Result<()> {
    let id = id.trim();
    if id.is_empty() {
        bail!("Client id must not be empty");
    }
    let mut config = fundlink_core::workspace::load_config()?;
    config.processor.client_id = id.to_string();
    fundlink_core::workspace::save_config(&config)?;
    println!("✓ WePay client id set to {id}");
    Ok(())
}

/// `fundlink configure secret <secret>`
pub fn set_secret(secret: &str) -> Result<()> {
    SecretStore::store_client_secret(secret)?;
    println!("✓ Client secret stored in the OS keyring ({})", mask_secret(secret.trim()));
    Ok(())
}

/// `fundlink configure sandbox <true|false>`
pub fn set_sandbox(enabled: bool) -> Result<()> {
    let mut config = fundlink_core::workspace::load_config()?;
    config.processor.sandbox = enabled;
    fundlink_core::workspace::save_config(&config)?;
    println!("✓ Environment set to {}", Environment::from_sandbox_flag(enabled));
    Ok(())
}

/// `fundlink configure submit-page <id>`
pub fn set_submission_page(id: u64) -> Result<()> {
    let mut config = fundlink_core::workspace::load_config()?;
    config.site.submission_page = id;
    fundlink_core::workspace::save_config(&config)?;
    println!("✓ Submission page set to {id}");
    Ok(())
}

/// `fundlink configure permalink <url>`
pub fn set_permalink(raw: &str) -> Result<()> {
    let url = parse_permalink(raw)?;
    let mut config = fundlink_core::workspace::load_config()?;
    config.site.permalink = url.to_string();
    fundlink_core::workspace::save_config(&config)?;
    println!("✓ Submission page URL set to {url}");
    Ok(())
}

/// `fundlink configure fee <percent>` — empty disables the fee.
pub fn set_fee(raw: &str) -> Result<()> {
    let fee = AppFeeConfig::validate_setting(raw)?;
    let mut config = fundlink_core::workspace::load_config()?;
    config.site.app_fee_percent = raw.trim().trim_end_matches('%').trim().to_string();
    fundlink_core::workspace::save_config(&config)?;

    match fee.percent_value() {
        Some(p) => println!("✓ Site fee set to {p}% of each contribution"),
        None => println!("✓ Site fee disabled — no app_fee is sent"),
    }
    Ok(())
}

/// `fundlink configure verbose <true|false>`
pub fn set_verbose(enabled: bool) -> Result<()> {
    let mut config = fundlink_core::workspace::load_config()?;
    config.system.verbose = enabled;
    fundlink_core::workspace::save_config(&config)?;
    println!("✓ verbose = {enabled}");
    Ok(())
}

fn parse_permalink(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| anyhow::anyhow!("Invalid URL '{raw}': {e}"))?;
    match url.scheme() {
        "http" | "https" => {}
        other => bail!("Unsupported URL scheme '{other}'. Use http or https"),
    }
    if url.query().is_some() {
        bail!("The submission page URL must not carry a query string");
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_permalink() {
        assert_eq!(
            parse_permalink(" https://site.test/submit ").unwrap().as_str(),
            "https://site.test/submit"
        );
        assert!(parse_permalink("ftp://site.test/submit").is_err());
        assert!(parse_permalink("https://site.test/submit?code=1").is_err());
        assert!(parse_permalink("not a url").is_err());
    }
}
