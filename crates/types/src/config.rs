use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
//  APP CONFIG — top-level, stored at ~/.fundlink/config.toml
// ═══════════════════════════════════════════════════════════════════════

/// Top-level configuration stored in `$HOME/.fundlink/config.toml`.
///
/// ```toml
/// [system]
/// verbose = false
///
/// [processor]
/// client_id = "123456"
/// sandbox = true
///
/// [site]
/// submission_page = 42
/// permalink = "https://example.test/submit"
/// app_fee_percent = "5"
/// ```
///
/// The client secret is not part of this file: it lives in the OS keyring
/// (or `FUNDLINK_CLIENT_SECRET`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Enable verbose tracing output.
    #[serde(default)]
    pub verbose: bool,
}

// ═══════════════════════════════════════════════════════════════════════
//  PROCESSOR CONFIG
// ═══════════════════════════════════════════════════════════════════════

/// Processor application credentials and environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// OAuth2 client id issued by WePay.
    #[serde(default)]
    pub client_id: String,

    /// Dispatch API calls to the staging environment.
    #[serde(default = "default_sandbox")]
    pub sandbox: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            sandbox: default_sandbox(),
        }
    }
}

fn default_sandbox() -> bool {
    true
}

// ═══════════════════════════════════════════════════════════════════════
//  SITE CONFIG
// ═══════════════════════════════════════════════════════════════════════

/// Host-site settings the integration reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Page id of the campaign submission page. The OAuth callback is only
    /// honoured on this page.
    #[serde(default)]
    pub submission_page: u64,

    /// Canonical address of the submission page, used as OAuth return URL.
    #[serde(default = "default_permalink")]
    pub permalink: String,

    /// Site fee percentage kept raw. Empty = no fee configured.
    #[serde(default)]
    pub app_fee_percent: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            submission_page: 0,
            permalink: default_permalink(),
            app_fee_percent: String::new(),
        }
    }
}

fn default_permalink() -> String {
    "https://example.test/submit".into()
}

impl AppConfig {
    /// Serialize to a TOML string for writing to disk.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserialize from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// True once a client id has been configured.
    pub fn has_client_id(&self) -> bool {
        !self.processor.client_id.trim().is_empty()
    }
}
