//! HTML fragments shown on the campaign submission page.
//!
//! Templates are registered once under `.html` names, so Tera autoescapes
//! every value inserted into them.

use std::sync::OnceLock;

use fundlink_common::error::{FundlinkError, FundlinkResult};
use tera::{Context, Tera};
use url::Url;

const CALL_TO_ACTION: &str = "wepay/call_to_action.html";
const ERROR_NOTICE: &str = "wepay/error_notice.html";

const CALL_TO_ACTION_TEMPLATE: &str = r#"<p>Before you may begin, you must first create an account on our payment processing service, <a href="http://wepay.com">WePay</a>.</p>
<p><a href="{{ authorize_url }}" class="button wepay-oauth-create-account">Create an account on WePay &rarr;</a></p>"#;

const ERROR_NOTICE_TEMPLATE: &str =
    r#"<p class="edd-alert edd-alert-error wepay-oauth-error">{{ message }}</p>"#;

static TEMPLATES: OnceLock<Result<Tera, String>> = OnceLock::new();

fn templates() -> FundlinkResult<&'static Tera> {
    TEMPLATES
        .get_or_init(|| {
            let mut tera = Tera::default();
            tera.add_raw_templates(vec![
                (CALL_TO_ACTION, CALL_TO_ACTION_TEMPLATE),
                (ERROR_NOTICE, ERROR_NOTICE_TEMPLATE),
            ])
            .map_err(|e| e.to_string())?;
            Ok(tera)
        })
        .as_ref()
        .map_err(|e| FundlinkError::Template(e.clone()))
}

fn render(name: &str, ctx: &Context) -> FundlinkResult<String> {
    templates()?
        .render(name, ctx)
        .map_err(|e| FundlinkError::Template(format!("{name}: {e}")))
}

/// Call-to-action shown instead of the submission form to users who
/// have not linked a WePay account yet.
pub fn call_to_action(authorize_url: &Url) -> FundlinkResult<String> {
    let mut ctx = Context::new();
    ctx.insert("authorize_url", authorize_url.as_str());
    render(CALL_TO_ACTION, &ctx)
}

/// Notice rendered above the submission page after a failed link attempt.
pub fn link_error_notice(message: &str) -> FundlinkResult<String> {
    let mut ctx = Context::new();
    ctx.insert("message", message);
    render(ERROR_NOTICE, &ctx)
}
