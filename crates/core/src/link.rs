//! WePay account-link handshake.
//!
//! The submission page sends campaign owners to WePay's authorization
//! page; WePay redirects back to the same page with `?code=...`. On that
//! request the code is exchanged for a token, a merchant account is
//! created under it, and the result is stored against the user.

use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use fundlink_common::error::{FundlinkError, FundlinkResult};
use fundlink_common::traits::{PaymentProcessor, SubmissionGate, UserStore};
use fundlink_common::types::*;

use crate::render;

/// Site settings the handshake reads.
#[derive(Debug, Clone)]
pub struct LinkSettings {
    /// Page id the callback is honoured on.
    pub submission_page: PageId,
    /// Canonical address of the submission page.
    pub return_url: String,
}

/// What happened on a callback request.
#[derive(Debug)]
pub enum HandshakeOutcome {
    Linked(LinkedAccount),
    /// `message` is safe to show the user; `error` keeps the detail.
    Failed { message: String, error: FundlinkError },
}

impl HandshakeOutcome {
    pub fn is_linked(&self) -> bool {
        matches!(self, HandshakeOutcome::Linked(_))
    }

    /// Error notice for the page, if the handshake failed.
    pub fn notice_html(&self) -> FundlinkResult<Option<String>> {
        match self {
            HandshakeOutcome::Linked(_) => Ok(None),
            HandshakeOutcome::Failed { message, .. } => render::link_error_notice(message).map(Some),
        }
    }
}

pub struct AccountLinker {
    processor: Arc<dyn PaymentProcessor>,
    users: Arc<dyn UserStore>,
    settings: LinkSettings,
}

impl AccountLinker {
    pub fn new(
        processor: Arc<dyn PaymentProcessor>,
        users: Arc<dyn UserStore>,
        settings: LinkSettings,
    ) -> Self {
        Self {
            processor,
            users,
            settings,
        }
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    pub fn environment(&self) -> Environment {
        self.processor.environment()
    }

    /// Authorization URL for `return_url`. No network call.
    pub fn build_authorization_url(&self, return_url: &str) -> FundlinkResult<Url> {
        self.processor
            .authorization_url(&AuthorizationRequest::new(return_url))
    }

    /// Page-render hook. Acts only on the submission page when a `code`
    /// is present; every other request yields `None`.
    pub async fn listen(&self, request: &PageRequest) -> Option<HandshakeOutcome> {
        if request.page_id != self.settings.submission_page {
            return None;
        }
        let code = request.authorization_code()?;

        debug!(user = request.user.id, "WePay authorization callback received");
        let outcome = match self
            .complete_handshake(code, &request.permalink, &request.user)
            .await
        {
            Ok(account) => HandshakeOutcome::Linked(account),
            Err(error) => {
                warn!(user = request.user.id, error = %error, "WePay account link failed");
                HandshakeOutcome::Failed {
                    message: error.user_message(),
                    error,
                }
            }
        };
        Some(outcome)
    }

    /// Exchange `code`, create the merchant account and store the link.
    /// Nothing is written unless every step succeeds.
    pub async fn complete_handshake(
        &self,
        code: &str,
        return_url: &str,
        user: &UserProfile,
    ) -> FundlinkResult<LinkedAccount> {
        let grant = self.processor.exchange_code(code, return_url).await?;
        debug!(user = user.id, "authorization code exchanged");

        let created = self
            .processor
            .create_account(&grant.access_token, &user.email, &user.nicename)
            .await?;

        let account = LinkedAccount::from_grant(&grant, created);
        self.users.save_linked_account(user.id, &account)?;

        info!(user = user.id, account_id = %account.account_id, "WePay account linked");
        Ok(account)
    }
}

impl SubmissionGate for AccountLinker {
    fn needs_linking(&self, user: UserId) -> FundlinkResult<bool> {
        let linked = self
            .users
            .linked_account(user)?
            .is_some_and(|a| a.is_linked());
        Ok(!linked)
    }

    fn render_call_to_action(&self) -> FundlinkResult<String> {
        let url = self.build_authorization_url(&self.settings.return_url)?;
        render::call_to_action(&url)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use fundlink_common::constants::{META_ACCESS_TOKEN, META_ACCOUNT_ID, META_ACCOUNT_URI};

    use super::*;
    use crate::db::FundlinkDb;
    use crate::testing::*;

    const SUBMIT_PAGE: PageId = 42;
    const PERMALINK: &str = "https://site.test/submit";

    fn settings() -> LinkSettings {
        LinkSettings {
            submission_page: SUBMIT_PAGE,
            return_url: PERMALINK.into(),
        }
    }

    fn linker(processor: Arc<FakeProcessor>, db: Arc<FundlinkDb>) -> AccountLinker {
        AccountLinker::new(processor, db, settings())
    }

    fn callback(page_id: PageId, code: Option<&str>) -> PageRequest {
        let mut query = HashMap::new();
        if let Some(code) = code {
            query.insert("code".to_string(), code.to_string());
        }
        PageRequest {
            page_id,
            permalink: PERMALINK.into(),
            query,
            user: owner(),
        }
    }

    fn empty_db() -> Arc<FundlinkDb> {
        Arc::new(FundlinkDb::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_callback_links_account() {
        let processor = Arc::new(FakeProcessor::ok());
        let db = empty_db();
        let linker = linker(processor.clone(), db.clone());

        let outcome = linker.listen(&callback(SUBMIT_PAGE, Some("abc123"))).await.unwrap();
        assert!(outcome.is_linked());
        assert!(outcome.notice_html().unwrap().is_none());

        assert_eq!(db.user_meta(7, META_ACCOUNT_ID).unwrap().as_deref(), Some("acc_1"));
        assert_eq!(db.user_meta(7, META_ACCESS_TOKEN).unwrap().as_deref(), Some("tok_1"));
        assert_eq!(
            db.user_meta(7, META_ACCOUNT_URI).unwrap().as_deref(),
            Some("https://wepay.test/acc_1")
        );
        assert!(!linker.needs_linking(7).unwrap());

        assert_eq!(
            processor.calls(),
            vec![
                format!("exchange:abc123:{PERMALINK}"),
                "create:tok_1:owner@site.test:owner".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_other_page_is_ignored() {
        let processor = Arc::new(FakeProcessor::ok());
        let db = empty_db();
        let linker = linker(processor.clone(), db.clone());

        assert!(linker.listen(&callback(99, Some("abc123"))).await.is_none());
        assert!(processor.calls().is_empty());
        assert!(db.linked_account(7).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_or_blank_code_is_ignored() {
        let processor = Arc::new(FakeProcessor::ok());
        let linker = linker(processor.clone(), empty_db());

        assert!(linker.listen(&callback(SUBMIT_PAGE, None)).await.is_none());
        assert!(linker.listen(&callback(SUBMIT_PAGE, Some("  "))).await.is_none());
        assert!(processor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_exchange_failure_writes_nothing() {
        let processor = Arc::new(FakeProcessor::failing_exchange());
        let db = empty_db();
        let linker = linker(processor.clone(), db.clone());

        let outcome = linker.listen(&callback(SUBMIT_PAGE, Some("abc123"))).await.unwrap();
        match &outcome {
            HandshakeOutcome::Failed { message, error } => {
                assert!(matches!(error, FundlinkError::TokenExchange(_)));
                assert!(!message.contains("invalid_grant"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(outcome.notice_html().unwrap().unwrap().contains("wepay-oauth-error"));
        assert!(db.linked_account(7).unwrap().is_none());
        assert!(linker.needs_linking(7).unwrap());
        // Account creation is never attempted after a failed exchange.
        assert_eq!(processor.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_create_failure_writes_nothing() {
        let processor = Arc::new(FakeProcessor::failing_create());
        let db = empty_db();
        let linker = linker(processor, db.clone());

        let err = linker
            .complete_handshake("abc123", PERMALINK, &owner())
            .await
            .unwrap_err();
        assert!(matches!(err, FundlinkError::AccountCreation(_)));
        for key in [META_ACCOUNT_ID, META_ACCESS_TOKEN, META_ACCOUNT_URI] {
            assert!(db.user_meta(7, key).unwrap().is_none(), "{key} written");
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let processor = Arc::new(FakeProcessor::ok());
        let linker = AccountLinker::new(processor, Arc::new(ReadOnlyUsers::default()), settings());

        let outcome = linker.listen(&callback(SUBMIT_PAGE, Some("abc123"))).await.unwrap();
        assert!(matches!(
            outcome,
            HandshakeOutcome::Failed {
                error: FundlinkError::Database(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_relink_overwrites_previous_account() {
        let processor = Arc::new(FakeProcessor::ok());
        let db = empty_db();
        db.save_linked_account(
            7,
            &LinkedAccount {
                account_id: "acc_old".into(),
                access_token: "tok_old".into(),
                account_uri: "https://wepay.test/acc_old".into(),
            },
        )
        .unwrap();
        let linker = linker(processor, db.clone());

        linker.complete_handshake("abc123", PERMALINK, &owner()).await.unwrap();
        assert_eq!(db.linked_account(7).unwrap().unwrap(), linked_owner());
    }

    #[test]
    fn test_needs_linking() {
        let db = empty_db();
        let linker = linker(Arc::new(FakeProcessor::ok()), db.clone());
        assert!(linker.needs_linking(7).unwrap());

        db.set_user_meta(7, META_ACCOUNT_ID, "   ").unwrap();
        assert!(linker.needs_linking(7).unwrap());

        db.set_user_meta(7, META_ACCOUNT_ID, "acc_1").unwrap();
        assert!(!linker.needs_linking(7).unwrap());
    }

    #[test]
    fn test_token_and_uri_alone_do_not_link() {
        let db = empty_db();
        let linker = linker(Arc::new(FakeProcessor::ok()), db.clone());

        db.set_user_meta(7, META_ACCESS_TOKEN, "tok_1").unwrap();
        assert!(linker.needs_linking(7).unwrap());

        db.set_user_meta(7, META_ACCOUNT_URI, "https://wepay.test/acc_1").unwrap();
        assert!(linker.needs_linking(7).unwrap());
    }

    #[test]
    fn test_losing_token_or_uri_keeps_link() {
        let db = empty_db();
        db.save_linked_account(7, &linked_owner()).unwrap();
        let linker = linker(Arc::new(FakeProcessor::ok()), db.clone());
        assert!(!linker.needs_linking(7).unwrap());

        db.set_user_meta(7, META_ACCESS_TOKEN, "").unwrap();
        assert!(!linker.needs_linking(7).unwrap());

        db.delete_user_meta(7, META_ACCOUNT_URI).unwrap();
        assert!(!linker.needs_linking(7).unwrap());

        db.delete_user_meta(7, META_ACCESS_TOKEN).unwrap();
        assert!(!linker.needs_linking(7).unwrap());

        db.delete_user_meta(7, META_ACCOUNT_ID).unwrap();
        assert!(linker.needs_linking(7).unwrap());
    }

    #[test]
    fn test_call_to_action_points_at_authorize_url() {
        let linker = linker(Arc::new(FakeProcessor::ok()), empty_db());
        let html = linker.render_call_to_action().unwrap();

        assert!(html.contains("wepay-oauth-create-account"));
        assert!(html.contains(
            "https:&#x2F;&#x2F;stage.wepay.com&#x2F;v2&#x2F;oauth2&#x2F;authorize?client_id=123456&amp;redirect_uri="
        ));
        assert!(html.contains("redirect_uri=https%3A%2F%2Fsite.test%2Fsubmit"));
    }

    #[test]
    fn test_build_authorization_url() {
        let linker = linker(Arc::new(FakeProcessor::ok()), empty_db());
        let url = linker.build_authorization_url(PERMALINK).unwrap();
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["redirect_uri"], PERMALINK);
        assert_eq!(
            pairs["scope"],
            "manage_accounts,collect_payments,preapprove_payments,send_money"
        );
        assert_eq!(linker.environment(), Environment::Sandbox);
    }
}
