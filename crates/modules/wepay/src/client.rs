//! WePay API v2 client — OAuth2 authorization + merchant account creation.
//!
//! Every call is a JSON `POST` against the environment's API endpoint.
//! Calls are made once: no retry, no backoff.

use async_trait::async_trait;
use fundlink_common::constants::{
    WEPAY_API_PRODUCTION, WEPAY_API_STAGING, WEPAY_UI_PRODUCTION, WEPAY_UI_STAGING,
};
use fundlink_common::error::{FundlinkError, FundlinkResult};
use fundlink_common::traits::PaymentProcessor;
use fundlink_common::types::{AuthorizationRequest, CreatedAccount, Environment, TokenGrant};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

/// Request timeout for every WePay call.
const HTTP_TIMEOUT_SECS: u64 = 15;

// ── Endpoints ───────────────────────────────────────────────────────

/// API base for an environment.
pub fn api_base(env: Environment) -> &'static str {
    match env {
        Environment::Sandbox => WEPAY_API_STAGING,
        Environment::Production => WEPAY_API_PRODUCTION,
    }
}

/// UI base (hosts the authorization page) for an environment.
pub fn ui_base(env: Environment) -> &'static str {
    match env {
        Environment::Sandbox => WEPAY_UI_STAGING,
        Environment::Production => WEPAY_UI_PRODUCTION,
    }
}

// ── Wire Types ──────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    code: &'a str,
}

/// `oauth2/token` response.
#[derive(Deserialize, Debug)]
pub struct WePayTokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<serde_json::Value>,
}

#[derive(Serialize, Debug)]
struct AccountCreateRequest<'a> {
    name: &'a str,
    description: &'a str,
}

/// `account/create` response. WePay returns `account_id` as a number.
#[derive(Deserialize, Debug)]
pub struct WePayAccountResponse {
    #[serde(default)]
    pub account_id: Option<serde_json::Value>,
    #[serde(default)]
    pub account_uri: Option<String>,
}

/// Error body returned with any non-2xx status.
#[derive(Deserialize, Debug, Default)]
pub struct WePayErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_code: Option<serde_json::Value>,
}

impl WePayErrorResponse {
    fn summary(&self, status: u16) -> String {
        let code = self
            .error_code
            .as_ref()
            .map(|c| format!(" [{c}]"))
            .unwrap_or_default();
        match (&self.error, &self.error_description) {
            (Some(e), Some(d)) => format!("HTTP {status} {e}{code}: {d}"),
            (Some(e), None) => format!("HTTP {status} {e}{code}"),
            (None, Some(d)) => format!("HTTP {status}{code}: {d}"),
            (None, None) => format!("HTTP {status}{code}"),
        }
    }
}

// ── Response Parsing ────────────────────────────────────────────────

/// Turn a raw `oauth2/token` response into a grant.
pub fn parse_token_response(status: u16, body: &str) -> FundlinkResult<TokenGrant> {
    if !(200..300).contains(&status) {
        let err: WePayErrorResponse = serde_json::from_str(body).unwrap_or_default();
        return Err(FundlinkError::TokenExchange(err.summary(status)));
    }

    let parsed: WePayTokenResponse = serde_json::from_str(body)
        .map_err(|e| FundlinkError::TokenExchange(format!("Parse token response: {e}")))?;

    let access_token = parsed
        .access_token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FundlinkError::TokenExchange("Response carried no access_token".into()))?;

    Ok(TokenGrant { access_token })
}

/// Turn a raw `account/create` response into the created account.
pub fn parse_account_response(status: u16, body: &str) -> FundlinkResult<CreatedAccount> {
    if !(200..300).contains(&status) {
        let err: WePayErrorResponse = serde_json::from_str(body).unwrap_or_default();
        return Err(FundlinkError::AccountCreation(err.summary(status)));
    }

    let parsed: WePayAccountResponse = serde_json::from_str(body)
        .map_err(|e| FundlinkError::AccountCreation(format!("Parse account response: {e}")))?;

    let account_id = parsed
        .account_id
        .as_ref()
        .and_then(id_to_string)
        .ok_or_else(|| FundlinkError::AccountCreation("Response carried no account_id".into()))?;

    let account_uri = parsed
        .account_uri
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| FundlinkError::AccountCreation("Response carried no account_uri".into()))?;

    Ok(CreatedAccount {
        account_id,
        account_uri,
    })
}

fn id_to_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// WePay v2 client bound to one environment and one OAuth2 application.
pub struct WePayClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    environment: Environment,
    api_base: Url,
    ui_base: Url,
}

impl WePayClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        environment: Environment,
    ) -> FundlinkResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(concat!("fundlink/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FundlinkError::Other(format!("Failed to build HTTP client: {e}")))?;

        let api_base = Url::parse(api_base(environment))
            .map_err(|e| FundlinkError::InvalidConfig(format!("WePay API endpoint: {e}")))?;
        let ui_base = Url::parse(ui_base(environment))
            .map_err(|e| FundlinkError::InvalidConfig(format!("WePay UI endpoint: {e}")))?;

        info!(environment = %environment, "WePay client initialized");

        Ok(Self {
            http,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            environment,
            api_base,
            ui_base,
        })
    }

    /// POST a JSON body to `endpoint`, returning the raw status and body.
    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> FundlinkResult<(u16, String)> {
        let url = self
            .api_base
            .join(endpoint)
            .map_err(|e| FundlinkError::Other(format!("Bad WePay endpoint '{endpoint}': {e}")))?;

        let mut req = self.http.post(url).json(body);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| FundlinkError::Network(format!("WePay {endpoint} request failed: {e}")))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| FundlinkError::Network(e.to_string()))?;

        debug!(endpoint, status, "WePay response");
        Ok((status, text))
    }
}

#[async_trait]
impl PaymentProcessor for WePayClient {
    fn environment(&self) -> Environment {
        self.environment
    }

    fn authorization_url(&self, request: &AuthorizationRequest) -> FundlinkResult<Url> {
        if self.client_id.trim().is_empty() {
            return Err(FundlinkError::InvalidConfig("WePay client id is not set".into()));
        }

        let mut url = self
            .ui_base
            .join("oauth2/authorize")
            .map_err(|e| FundlinkError::Other(format!("Bad WePay authorize endpoint: {e}")))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &request.return_url)
            .append_pair("scope", &request.scope_param());

        Ok(url)
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> FundlinkResult<TokenGrant> {
        if self.client_secret.is_empty() {
            return Err(FundlinkError::InvalidConfig("WePay client secret is not set".into()));
        }
        let body = TokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            redirect_uri,
            code,
        };
        let (status, text) = self.post("oauth2/token", &body, None).await?;
        parse_token_response(status, &text)
    }

    async fn create_account(
        &self,
        access_token: &str,
        name: &str,
        description: &str,
    ) -> FundlinkResult<CreatedAccount> {
        let body = AccountCreateRequest { name, description };
        let (status, text) = self
            .post("account/create", &body, Some(access_token))
            .await?;
        parse_account_response(status, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(env: Environment) -> WePayClient {
        WePayClient::new("123456", "s3cret", env).unwrap()
    }

    #[test]
    fn test_endpoints_per_environment() {
        assert_eq!(api_base(Environment::Sandbox), "https://stage.wepayapi.com/v2/");
        assert_eq!(api_base(Environment::Production), "https://wepayapi.com/v2/");
        assert_eq!(ui_base(Environment::Sandbox), "https://stage.wepay.com/v2/");
        assert_eq!(ui_base(Environment::Production), "https://www.wepay.com/v2/");
    }

    #[test]
    fn test_authorization_url_production() {
        let req = AuthorizationRequest::new("https://site.test/submit");
        let url = client(Environment::Production).authorization_url(&req).unwrap();

        assert_eq!(url.host_str(), Some("www.wepay.com"));
        assert_eq!(url.path(), "/v2/oauth2/authorize");

        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["client_id"], "123456");
        assert_eq!(pairs["redirect_uri"], "https://site.test/submit");
        assert_eq!(
            pairs["scope"],
            "manage_accounts,collect_payments,preapprove_payments,send_money"
        );
    }

    #[test]
    fn test_authorization_url_sandbox_and_escaped() {
        let req = AuthorizationRequest::new("https://site.test/submit?lang=en&x=1");
        let url = client(Environment::Sandbox).authorization_url(&req).unwrap();

        assert_eq!(url.host_str(), Some("stage.wepay.com"));
        let raw = url.as_str();
        // The return URL's own query must not leak into ours.
        assert!(!raw.contains("&x=1"));
        assert!(raw.contains("redirect_uri=https%3A%2F%2Fsite.test%2Fsubmit%3Flang%3Den%26x%3D1"));
    }

    #[test]
    fn test_authorization_url_requires_client_id() {
        let c = WePayClient::new("  ", "s", Environment::Sandbox).unwrap();
        let err = c
            .authorization_url(&AuthorizationRequest::new("https://site.test/submit"))
            .unwrap_err();
        assert!(matches!(err, FundlinkError::InvalidConfig(_)));
    }

    #[test]
    fn test_parse_token_ok() {
        let body = r#"{"user_id":"22754","access_token":"tok_1","token_type":"BEARER","expires_in":null}"#;
        let grant = parse_token_response(200, body).unwrap();
        assert_eq!(grant.access_token, "tok_1");
    }

    #[test]
    fn test_parse_token_error_body() {
        let body = r#"{"error":"invalid_request","error_description":"this code has expired","error_code":1012}"#;
        let err = parse_token_response(400, body).unwrap_err();
        match err {
            FundlinkError::TokenExchange(msg) => {
                assert!(msg.contains("HTTP 400"));
                assert!(msg.contains("this code has expired"));
                assert!(msg.contains("1012"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_token_missing_token() {
        let err = parse_token_response(200, r#"{"user_id":1}"#).unwrap_err();
        assert!(matches!(err, FundlinkError::TokenExchange(_)));

        let err = parse_token_response(200, "<html>").unwrap_err();
        assert!(matches!(err, FundlinkError::TokenExchange(_)));
    }

    #[test]
    fn test_parse_account_numeric_id() {
        let body = r#"{"account_id":12345,"account_uri":"https://stage.wepay.com/account/12345"}"#;
        let acct = parse_account_response(200, body).unwrap();
        assert_eq!(acct.account_id, "12345");
        assert_eq!(acct.account_uri, "https://stage.wepay.com/account/12345");
    }

    #[test]
    fn test_parse_account_string_id() {
        let body = r#"{"account_id":"acc_1","account_uri":"https://wepay.test/acc_1"}"#;
        let acct = parse_account_response(201, body).unwrap();
        assert_eq!(acct.account_id, "acc_1");
    }

    #[test]
    fn test_parse_account_malformed() {
        let err = parse_account_response(200, r#"{"account_uri":"https://wepay.test/x"}"#).unwrap_err();
        assert!(matches!(err, FundlinkError::AccountCreation(_)));

        let err = parse_account_response(200, r#"{"account_id":1}"#).unwrap_err();
        assert!(matches!(err, FundlinkError::AccountCreation(_)));

        let err = parse_account_response(500, "").unwrap_err();
        match err {
            FundlinkError::AccountCreation(msg) => assert_eq!(msg, "HTTP 500"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_requires_secret() {
        let c = WePayClient::new("123456", "", Environment::Sandbox).unwrap();
        let err = c.exchange_code("abc123", "https://site.test/submit").await.unwrap_err();
        assert!(matches!(err, FundlinkError::InvalidConfig(_)));
    }

    #[test]
    fn test_environment_reported() {
        let c = client(Environment::Sandbox);
        assert_eq!(c.environment(), Environment::Sandbox);
    }
}
