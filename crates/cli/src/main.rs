mod commands;
mod factory;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use fundlink_common::error::FundlinkError;
use fundlink_utils::output::OutputFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fundlink",
    about = "Fundlink — WePay account linking and checkout settlement for crowdfunding campaigns.",
    version,
    propagate_version = true
)]
struct Cli {
    #[arg(long, short = 'o', global = true, default_value = "table")]
    output: CliOutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat { Table, Json, JsonPretty }

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> OutputFormat {
        match f {
            CliOutputFormat::Table => OutputFormat::Table,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  TOP-LEVEL
// ═══════════════════════════════════════════════════════════════════════

#[derive(Subcommand)]
enum Commands {
    /// Configure processor credentials, site pages and the site fee.
    Configure {
        #[command(subcommand)]
        action: ConfigureAction,
    },

    /// WePay account linking: authorize URL, callback, status.
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Checkout hooks: site fee and settlement credentials.
    Checkout {
        #[command(subcommand)]
        action: CheckoutAction,
    },

    /// Campaign views backed by the owner's linked account.
    Campaign {
        #[command(subcommand)]
        action: CampaignAction,
    },

    /// Write users, campaigns and payments into the local store.
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },
}

// ═══════════════════════════════════════════════════════════════════════
//  CONFIGURE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Subcommand)]
enum ConfigureAction {
    /// Show all current configuration.
    Show,
    /// Set the WePay OAuth2 client id.
    ClientId { id: String },
    /// Store the WePay client secret in the OS keyring.
    Secret { secret: String },
    /// Use the WePay staging environment.
    Sandbox { enabled: bool },
    /// Set the page id of the campaign submission page.
    SubmitPage { id: u64 },
    /// Set the canonical URL of the submission page.
    Permalink { url: String },
    /// Set the site fee percentage (0-20). Pass "" to disable.
    Fee { percent: String },
    /// Toggle verbose mode.
    Verbose { enabled: bool },
}

// ═══════════════════════════════════════════════════════════════════════
//  LINK
// ═══════════════════════════════════════════════════════════════════════

#[derive(Subcommand)]
enum LinkAction {
    /// Print the WePay authorization URL for the submission page.
    Url,
    /// Process a WePay redirect as the given user on the given page.
    Callback {
        #[arg(long)] user: u64,
        #[arg(long)] page: u64,
        #[arg(long)] code: String,
    },
    /// Show whether a user has linked a WePay account.
    Status {
        #[arg(long)] user: u64,
    },
}

// ═══════════════════════════════════════════════════════════════════════
//  CHECKOUT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Subcommand)]
enum CheckoutAction {
    /// Compute the app fee added to a checkout.
    Fee {
        #[arg(long)] subtotal: String,
    },
    /// Resolve the account a checkout settles into.
    Creds {
        /// Campaign ids in the live cart.
        #[arg(long, value_delimiter = ',')] cart: Vec<u64>,
        /// Campaign ids in the session purchase.
        #[arg(long, value_delimiter = ',')] session: Vec<u64>,
        /// Stored payment id.
        #[arg(long)] payment: Option<u64>,
        /// Preapproval action (charge_wepay_preapproval, cancel_wepay_preapproval).
        #[arg(long)] action: Option<String>,
        /// Payment id carried by the preapproval action.
        #[arg(long)] action_payment: Option<String>,
    },
}

// ═══════════════════════════════════════════════════════════════════════
//  CAMPAIGN / SEED
// ═══════════════════════════════════════════════════════════════════════

#[derive(Subcommand)]
enum CampaignAction {
    /// Show who receives a campaign's funds.
    Payout { id: u64 },
}

#[derive(Subcommand)]
enum SeedAction {
    /// Create or replace a user.
    User {
        id: u64,
        #[arg(long)] email: String,
        #[arg(long)] nicename: String,
    },
    /// Create or replace a campaign.
    Campaign {
        id: u64,
        #[arg(long)] author: u64,
        #[arg(long, default_value = "publish")] status: String,
    },
    /// Store a payment's line items (campaign ids, in order).
    Payment {
        id: u64,
        #[arg(long, value_delimiter = ',', required = true)] items: Vec<u64>,
    },
}

// ═══════════════════════════════════════════════════════════════════════
//  ENTRYPOINT
// ═══════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let fmt: OutputFormat = cli.output.into();

    if let Err(e) = run(cli.command, fmt).await {
        match e.downcast_ref::<FundlinkError>() {
            Some(err) => {
                if fmt == OutputFormat::Table {
                    eprintln!("✗ {err}");
                    for hint in err.detail().hints {
                        eprintln!("  hint: {hint}");
                    }
                } else {
                    println!("{}", err.to_json());
                }
                std::process::exit(err.exit_code());
            }
            None => {
                eprintln!("✗ {e:#}");
                std::process::exit(1);
            }
        }
    }
}

async fn run(command: Commands, fmt: OutputFormat) -> Result<()> {
    fundlink_core::init_workspace()?;
    let config = fundlink_core::workspace::load_config()?;
    init_tracing(config.system.verbose);

    match command {
        Commands::Configure { action } => match action {
            ConfigureAction::Show => commands::configure::run(fmt),
            ConfigureAction::ClientId { id } => commands::configure::set_client_id(&id),
            ConfigureAction::Secret { secret } => commands::configure::set_secret(&secret),
            ConfigureAction::Sandbox { enabled } => commands::configure::set_sandbox(enabled),
            ConfigureAction::SubmitPage { id } => commands::configure::set_submission_page(id),
            ConfigureAction::Permalink { url } => commands::configure::set_permalink(&url),
            ConfigureAction::Fee { percent } => commands::configure::set_fee(&percent),
            ConfigureAction::Verbose { enabled } => commands::configure::set_verbose(enabled),
        },

        Commands::Link { action } => match action {
            LinkAction::Url => commands::link::authorize_url(&config, fmt),
            LinkAction::Callback { user, page, code } => {
                commands::link::callback(&config, user, page, &code, fmt).await
            }
            LinkAction::Status { user } => commands::link::status(&config, user, fmt),
        },

        Commands::Checkout { action } => match action {
            CheckoutAction::Fee { subtotal } => commands::checkout::fee(&config, &subtotal, fmt),
            CheckoutAction::Creds { cart, session, payment, action, action_payment } => {
                let request = commands::checkout::CredsRequest {
                    cart,
                    session,
                    payment,
                    action,
                    action_payment,
                };
                commands::checkout::creds(&config, request, fmt)
            }
        },

        Commands::Campaign { action } => match action {
            CampaignAction::Payout { id } => commands::campaign::payout(&config, id, fmt),
        },

        Commands::Seed { action } => match action {
            SeedAction::User { id, email, nicename } => commands::seed::user(id, &email, &nicename),
            SeedAction::Campaign { id, author, status } => commands::seed::campaign(id, author, &status),
            SeedAction::Payment { id, items } => commands::seed::payment(id, &items),
        },
    }
}

/// `RUST_LOG` wins; otherwise `verbose = true` turns on debug output.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
