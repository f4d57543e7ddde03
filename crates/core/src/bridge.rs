//! Service object the host builds once at startup.
//!
//! Holds the account linker and the checkout decorator, wired to one
//! processor client and one set of stores. Processor modules are chosen
//! by the binary; this crate only sees `PaymentProcessor`.

use std::sync::Arc;

use tracing::info;

use fundlink_common::error::FundlinkResult;
use fundlink_common::traits::*;
use fundlink_common::types::*;
use fundlink_types::config::AppConfig;

use crate::campaign::{self, CampaignPayout, SubmissionFields};
use crate::checkout::CheckoutDecorator;
use crate::link::{AccountLinker, LinkSettings};
use crate::settlement::SettlementResolver;

/// Everything the bridge consumes.
pub struct Collaborators {
    pub processor: Arc<dyn PaymentProcessor>,
    pub users: Arc<dyn UserStore>,
    pub campaigns: Arc<dyn CampaignStore>,
    pub payments: Arc<dyn PaymentStore>,
}

impl Collaborators {
    /// Processor plus one store serving all three store roles.
    pub fn with_store<S>(processor: Arc<dyn PaymentProcessor>, store: Arc<S>) -> Self
    where
        S: UserStore + CampaignStore + PaymentStore + 'static,
    {
        Self {
            processor,
            users: store.clone(),
            campaigns: store.clone(),
            payments: store,
        }
    }
}

pub struct Bridge {
    linker: AccountLinker,
    checkout: CheckoutDecorator,
    users: Arc<dyn UserStore>,
    campaigns: Arc<dyn CampaignStore>,
}

impl Bridge {
    pub fn new(config: &AppConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            processor,
            users,
            campaigns,
            payments,
        } = collaborators;

        let linker = AccountLinker::new(
            processor,
            users.clone(),
            LinkSettings {
                submission_page: config.site.submission_page,
                return_url: config.site.permalink.clone(),
            },
        );
        let resolver = SettlementResolver::new(campaigns.clone(), payments, users.clone());
        let checkout = CheckoutDecorator::new(config.site.app_fee_percent.clone(), resolver);

        info!(
            environment = %linker.environment(),
            submission_page = config.site.submission_page,
            "bridge ready"
        );
        Self {
            linker,
            checkout,
            users,
            campaigns,
        }
    }

    pub fn linker(&self) -> &AccountLinker {
        &self.linker
    }

    pub fn checkout(&self) -> &CheckoutDecorator {
        &self.checkout
    }

    /// Submission-page gate for the host.
    pub fn gate(&self) -> &dyn SubmissionGate {
        &self.linker
    }

    /// Checkout hooks for the host's payment gateway.
    pub fn decorator(&self) -> &dyn PaymentDecorator {
        &self.checkout
    }

    pub fn submission_fields(&self, user: UserId) -> FundlinkResult<Option<SubmissionFields>> {
        campaign::submission_fields(self.users.as_ref(), user)
    }

    pub fn campaign_payout(&self, campaign_id: CampaignId) -> FundlinkResult<Option<CampaignPayout>> {
        campaign::campaign_payout(self.campaigns.as_ref(), self.users.as_ref(), campaign_id)
    }

    pub fn campaign_meta_keys(&self, existing: Vec<String>) -> Vec<String> {
        campaign::campaign_meta_keys(existing)
    }
}
