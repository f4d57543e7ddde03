use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fundlink_types::config::AppConfig;
use tracing::info;

/// Dotfolder name under `$HOME`.
const DOTFOLDER: &str = ".fundlink";

/// Required subdirectories inside the dotfolder.
const SUBDIRS: &[&str] = &["logs", "data"];

const CONFIG_FILE: &str = "config.toml";

/// Resolve the root path: `$HOME/.fundlink/`.
pub fn root_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(DOTFOLDER))
}

/// Resolve a path relative to the dotfolder root.
pub fn resolve(relative: &str) -> Result<PathBuf> {
    Ok(root_dir()?.join(relative))
}

/// Ensure the dotfolder structure exists. Idempotent.
///
/// ```text
/// $HOME/.fundlink/
/// ├── config.toml
/// ├── logs/
/// └── data/
///     └── fundlink.db  (created on first open)
/// ```
pub fn init_workspace() -> Result<()> {
    init_workspace_at(&root_dir()?)
}

pub fn init_workspace_at(root: &Path) -> Result<()> {
    for sub in SUBDIRS {
        let dir = root.join(sub);
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            info!("created directory: {}", dir.display());
        }
    }

    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        let toml_str = AppConfig::default()
            .to_toml_string()
            .context("Failed to serialize default config")?;
        fs::write(&config_path, &toml_str)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        info!("created default config: {}", config_path.display());
    }

    info!("workspace initialized at {}", root.display());
    Ok(())
}

/// Load the config from disk.
pub fn load_config() -> Result<AppConfig> {
    load_config_at(&root_dir()?)
}

/// Load `config.toml` under `root`. A file that no longer parses is
/// rewritten with defaults, keeping the client id, sandbox flag and
/// submission page when they can still be read.
pub fn load_config_at(root: &Path) -> Result<AppConfig> {
    let config_path = root.join(CONFIG_FILE);
    let raw = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;

    match AppConfig::from_toml_str(&raw) {
        Ok(config) => Ok(config),
        Err(e) => {
            info!("config.toml unreadable ({e}), migrating to current schema");
            let mut new_config = AppConfig::default();

            if let Ok(old) = raw.parse::<toml::Table>() {
                if let Some(processor) = old.get("processor").and_then(|v| v.as_table()) {
                    if let Some(id) = processor.get("client_id").and_then(|v| v.as_str()) {
                        new_config.processor.client_id = id.to_string();
                    }
                    if let Some(sandbox) = processor.get("sandbox").and_then(|v| v.as_bool()) {
                        new_config.processor.sandbox = sandbox;
                    }
                }
                if let Some(site) = old.get("site").and_then(|v| v.as_table()) {
                    if let Some(page) = site.get("submission_page").and_then(|v| v.as_integer()) {
                        new_config.site.submission_page = page.max(0) as u64;
                    }
                }
            }

            save_config_at(root, &new_config)?;
            info!("config migrated successfully");
            Ok(new_config)
        }
    }
}

/// Write the config back to disk.
pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_at(&root_dir()?, config)
}

pub fn save_config_at(root: &Path, config: &AppConfig) -> Result<()> {
    let config_path = root.join(CONFIG_FILE);
    let toml_str = config
        .to_toml_string()
        .context("Failed to serialize config")?;
    fs::write(&config_path, &toml_str)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(())
}
