//! In-process collaborators for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use fundlink_common::error::{FundlinkError, FundlinkResult};
use fundlink_common::traits::{PaymentProcessor, UserStore};
use fundlink_common::types::*;

use crate::db::FundlinkDb;

/// Scripted processor: hands out `tok_1` / `acc_1` unless told to fail.
pub struct FakeProcessor {
    pub fail_exchange: bool,
    pub fail_create: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProcessor {
    pub fn ok() -> Self {
        Self {
            fail_exchange: false,
            fail_create: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_exchange() -> Self {
        Self {
            fail_exchange: true,
            ..Self::ok()
        }
    }

    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::ok()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProcessor for FakeProcessor {
    fn environment(&self) -> Environment {
        Environment::Sandbox
    }

    fn authorization_url(&self, request: &AuthorizationRequest) -> FundlinkResult<Url> {
        let mut url = Url::parse("https://stage.wepay.com/v2/oauth2/authorize")
            .map_err(|e| FundlinkError::Other(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", "123456")
            .append_pair("redirect_uri", &request.return_url)
            .append_pair("scope", &request.scope_param());
        Ok(url)
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> FundlinkResult<TokenGrant> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("exchange:{code}:{redirect_uri}"));
        if self.fail_exchange {
            return Err(FundlinkError::TokenExchange("invalid_grant: code expired".into()));
        }
        Ok(TokenGrant {
            access_token: "tok_1".into(),
        })
    }

    async fn create_account(
        &self,
        access_token: &str,
        name: &str,
        description: &str,
    ) -> FundlinkResult<CreatedAccount> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("create:{access_token}:{name}:{description}"));
        if self.fail_create {
            return Err(FundlinkError::AccountCreation("access_denied".into()));
        }
        Ok(CreatedAccount {
            account_id: "acc_1".into(),
            account_uri: "https://wepay.test/acc_1".into(),
        })
    }
}

/// User store whose writes always fail. Reads fail too with `fail_reads`.
#[derive(Default)]
pub struct ReadOnlyUsers {
    pub accounts: HashMap<UserId, LinkedAccount>,
    pub fail_reads: bool,
}

impl UserStore for ReadOnlyUsers {
    fn linked_account(&self, user: UserId) -> FundlinkResult<Option<LinkedAccount>> {
        if self.fail_reads {
            return Err(FundlinkError::Database("disk I/O error".into()));
        }
        Ok(self.accounts.get(&user).cloned())
    }

    fn save_linked_account(&self, _user: UserId, _account: &LinkedAccount) -> FundlinkResult<()> {
        Err(FundlinkError::Database("attempt to write a readonly database".into()))
    }

    fn profile(&self, _user: UserId) -> FundlinkResult<Option<UserProfile>> {
        Ok(None)
    }
}

pub fn owner() -> UserProfile {
    UserProfile {
        id: 7,
        email: "owner@site.test".into(),
        nicename: "owner".into(),
    }
}

pub fn linked_owner() -> LinkedAccount {
    LinkedAccount {
        account_id: "acc_1".into(),
        access_token: "tok_1".into(),
        account_uri: "https://wepay.test/acc_1".into(),
    }
}

/// In-memory db with user 7 owning campaigns 12 (published) and 13
/// (auto-draft). User 7 is linked; user 8 exists but is not.
pub fn seeded_db() -> Arc<FundlinkDb> {
    let db = FundlinkDb::open_in_memory().unwrap();
    db.upsert_user(&owner()).unwrap();
    db.upsert_user(&UserProfile {
        id: 8,
        email: "second@site.test".into(),
        nicename: "second".into(),
    })
    .unwrap();
    db.save_linked_account(7, &linked_owner()).unwrap();
    db.upsert_campaign(&Campaign {
        id: 12,
        author: 7,
        status: CampaignStatus::Publish,
    })
    .unwrap();
    db.upsert_campaign(&Campaign {
        id: 13,
        author: 7,
        status: CampaignStatus::AutoDraft,
    })
    .unwrap();
    db.upsert_campaign(&Campaign {
        id: 14,
        author: 8,
        status: CampaignStatus::Publish,
    })
    .unwrap();
    Arc::new(db)
}
