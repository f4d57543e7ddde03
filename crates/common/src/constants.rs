//! Universal constants for fundlink.

/// WePay API endpoint (production).
pub const WEPAY_API_PRODUCTION: &str = "https://wepayapi.com/v2/";

/// WePay API endpoint (staging / sandbox).
pub const WEPAY_API_STAGING: &str = "https://stage.wepayapi.com/v2/";

/// WePay UI endpoint hosting the OAuth2 authorization page (production).
pub const WEPAY_UI_PRODUCTION: &str = "https://www.wepay.com/v2/";

/// WePay UI endpoint (staging / sandbox).
pub const WEPAY_UI_STAGING: &str = "https://stage.wepay.com/v2/";

/// User-meta key holding the linked processor account id.
pub const META_ACCOUNT_ID: &str = "wepay_account_id";

/// User-meta key holding the linked account's bearer token.
pub const META_ACCESS_TOKEN: &str = "wepay_access_token";

/// User-meta key holding the processor-hosted account profile URL.
pub const META_ACCOUNT_URI: &str = "wepay_account_uri";

/// Query parameter carrying the OAuth2 authorization code on callback.
pub const CODE_PARAM: &str = "code";

/// Query parameter naming the checkout action.
pub const ACTION_PARAM: &str = "edd-action";

/// Query parameter carrying the payment id of a preapproval action.
pub const PAYMENT_ID_PARAM: &str = "payment_id";

/// Checkout action that charges a stored preapproval.
pub const ACTION_CHARGE_PREAPPROVAL: &str = "charge_wepay_preapproval";

/// Checkout action that cancels a stored preapproval.
pub const ACTION_CANCEL_PREAPPROVAL: &str = "cancel_wepay_preapproval";

/// Key added to outbound checkout arguments when a site fee is configured.
pub const APP_FEE_ARG: &str = "app_fee";

/// Upper bound accepted for the site fee percentage.
pub const MAX_APP_FEE_PERCENT: u32 = 20;
