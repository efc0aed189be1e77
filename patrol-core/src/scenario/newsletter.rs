use crate::config::SuiteConfig;
use crate::runner::{Case, CaseResult, Runner, ScenarioGroup};
use crate::scenario::session_config;
use crate::trace::CaseContext;
use anyhow::ensure;
use futures::FutureExt;
use patrol_browser::{BrowserSession, Engine, Key, Page};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;
use uuid::Uuid;

pub const GROUP: &str = "newsletter form";

const EMAIL_INPUT: &str = r#"input[type="email"]"#;
const SUBMIT_BUTTON: &str = ".button-secondary";
const NEWSLETTER_FORM: &str = r#"[data-form-id="52611e5e-cc55-4960-bf4a-a2adb36291f6"]"#;
const SUCCESS_HEADING: &str = "Thank you for signing up!";
const SUCCESS_BODY: &str =
    "We are looking forward to keep you posted with updates and interesting articles.";
const THANKS_URL_FRAGMENT: &str = "thanks-for-signing-up";
const INVALID_MARKERS: [&str; 2] = ["invalid", "error"];

/// A fresh, unique address per run so resubmissions never collide.
pub fn random_email() -> String {
    format!("{}@new.com", Uuid::new_v4().simple())
}

/// Strings the form's own validation must reject.
pub fn invalid_emails() -> Vec<String> {
    vec![
        "".to_string(),
        "invalidemail.com".to_string(),
        "test@#$%.com".to_string(),
        "test @example.com".to_string(),
        "!#$%^&*()".to_string(),
        format!("{}@new.com", "a".repeat(65)),
    ]
}

/// Injection payloads the form must never accept.
pub fn malicious_inputs() -> Vec<&'static str> {
    vec![
        r#"<script>alert("XSS Attack")</script>"#,
        r#"<img src="x" onerror="alert('XSS')">"#,
        r#"<div onmouseover="alert('XSS')">Hover me</div>"#,
    ]
}

/// The newsletter group shares one browser session across its cases and
/// closes it at teardown, so the cases run sequentially.
pub async fn run(
    config: Arc<SuiteConfig>,
    engine: Engine,
    runner: &Runner,
) -> anyhow::Result<Vec<CaseResult>> {
    let session = Arc::new(BrowserSession::launch(session_config(&config, engine)).await?);

    let cases = vec![
        case("has the expected title", &config, &session, has_expected_title),
        case("locates the newsletter form", &config, &session, locates_form),
        case("submits with a valid email", &config, &session, submits_valid_email),
        case("valid submission completes under the ceiling", &config, &session, valid_submission_is_fast),
        case("submits with a valid email via keyboard", &config, &session, keyboard_valid_email),
        case("resets the email input after reload", &config, &session, resets_after_reload),
        case("marks incorrect email formats as invalid", &config, &session, rejects_invalid_formats),
        case("does not submit malicious input", &config, &session, rejects_malicious_input),
        case("rejects empty submission via keyboard", &config, &session, keyboard_empty_is_invalid),
    ];

    let group = ScenarioGroup {
        name: GROUP.to_string(),
        parallel: false,
        case_timeout: config.form_case_timeout,
        cases,
    };

    let results = runner.run_group(group).await;

    match Arc::try_unwrap(session) {
        Ok(session) => {
            if let Err(e) = session.close().await {
                warn!("Failed to close newsletter session: {}", e);
            }
        }
        Err(_) => warn!("Newsletter session still referenced at teardown"),
    }

    Ok(results)
}

fn case<F, Fut>(
    name: &str,
    config: &Arc<SuiteConfig>,
    session: &Arc<BrowserSession>,
    body: F,
) -> Case
where
    F: Fn(Arc<SuiteConfig>, Arc<BrowserSession>, CaseContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let config = config.clone();
    let session = session.clone();
    Case::new(name, move |ctx| {
        body(config.clone(), session.clone(), ctx).boxed()
    })
}

async fn open_home(session: &BrowserSession, config: &SuiteConfig) -> anyhow::Result<Page> {
    let page = session.new_page().await?;
    page.goto(config.base_url.as_str()).await?;
    Ok(page)
}

/// Fill the email field and submit with the pointer, then assert the
/// success or error contract.
async fn fill_email_and_submit(
    page: &Page,
    config: &SuiteConfig,
    email: &str,
    expect_valid: bool,
) -> anyhow::Result<()> {
    page.fill(EMAIL_INPUT, email).await?;
    page.click(SUBMIT_BUTTON).await?;

    if expect_valid {
        page.wait_for_url_contains(THANKS_URL_FRAGMENT, config.ui_timeout)
            .await?;
        page.wait_for_text(SUCCESS_HEADING, config.ui_timeout).await?;
    } else {
        verify_error_state(page, config).await?;
        let path = page.current_path().await?;
        ensure!(
            path == config.base_url.path(),
            "expected to stay at '{}', ended up at '{}'",
            config.base_url.path(),
            path,
        );
    }
    Ok(())
}

async fn verify_success_message(page: &Page, config: &SuiteConfig) -> anyhow::Result<()> {
    page.wait_for_text(SUCCESS_HEADING, config.ui_timeout).await?;
    page.wait_for_text(SUCCESS_BODY, config.ui_timeout).await?;
    Ok(())
}

async fn verify_error_state(page: &Page, config: &SuiteConfig) -> anyhow::Result<()> {
    page.wait_for_class(EMAIL_INPUT, &INVALID_MARKERS, config.ui_timeout)
        .await?;
    let url = page.current_url().await?;
    ensure!(
        !url.as_str().contains(THANKS_URL_FRAGMENT),
        "form submitted despite invalid input, navigated to {}",
        url,
    );
    Ok(())
}

async fn has_expected_title(
    config: Arc<SuiteConfig>,
    session: Arc<BrowserSession>,
    _ctx: CaseContext,
) -> anyhow::Result<()> {
    let page = open_home(&session, &config).await?;
    let title = page.title().await?;
    ensure!(
        title.contains(&config.expected_title_fragment),
        "expected title containing '{}', got '{}'",
        config.expected_title_fragment,
        title,
    );
    Ok(())
}

async fn locates_form(
    config: Arc<SuiteConfig>,
    session: Arc<BrowserSession>,
    ctx: CaseContext,
) -> anyhow::Result<()> {
    let page = open_home(&session, &config).await?;
    ctx.step("wait for the form to be visible", async {
        Ok(page.wait_until_visible(NEWSLETTER_FORM, config.ui_timeout).await?)
    })
    .await
}

async fn submits_valid_email(
    config: Arc<SuiteConfig>,
    session: Arc<BrowserSession>,
    ctx: CaseContext,
) -> anyhow::Result<()> {
    let page = open_home(&session, &config).await?;
    let email = random_email();

    ctx.step("fill and submit", async {
        fill_email_and_submit(&page, &config, &email, true).await
    })
    .await?;

    let class = page.class_of(EMAIL_INPUT).await.unwrap_or_default();
    ensure!(
        !INVALID_MARKERS.iter().any(|marker| class.contains(marker)),
        "input flagged invalid after a valid submission (class '{}')",
        class,
    );

    page.wait_for_url_contains(THANKS_URL_FRAGMENT, config.ui_timeout)
        .await?;
    verify_success_message(&page, &config).await
}

async fn valid_submission_is_fast(
    config: Arc<SuiteConfig>,
    session: Arc<BrowserSession>,
    _ctx: CaseContext,
) -> anyhow::Result<()> {
    let page = open_home(&session, &config).await?;
    let email = random_email();

    let start = Instant::now();
    fill_email_and_submit(&page, &config, &email, true).await?;
    let elapsed = start.elapsed();

    ensure!(
        elapsed < config.submit_ceiling,
        "submission took {:?}, ceiling is {:?}",
        elapsed,
        config.submit_ceiling,
    );
    Ok(())
}

async fn keyboard_valid_email(
    config: Arc<SuiteConfig>,
    session: Arc<BrowserSession>,
    _ctx: CaseContext,
) -> anyhow::Result<()> {
    let page = open_home(&session, &config).await?;

    page.type_text(EMAIL_INPUT, "test@new.com").await?;
    page.press(Key::Tab).await?;
    page.press(Key::Enter).await?;

    page.wait_for_url_contains(THANKS_URL_FRAGMENT, config.ui_timeout)
        .await?;
    verify_success_message(&page, &config).await
}

async fn resets_after_reload(
    config: Arc<SuiteConfig>,
    session: Arc<BrowserSession>,
    _ctx: CaseContext,
) -> anyhow::Result<()> {
    let page = open_home(&session, &config).await?;

    page.clear_local_storage().await?;
    page.fill(EMAIL_INPUT, &random_email()).await?;
    page.reload().await?;

    let value = page.value_of(EMAIL_INPUT).await?;
    ensure!(
        value.is_empty(),
        "email input kept '{}' across a reload",
        value,
    );

    page.wait_until_visible(NEWSLETTER_FORM, config.ui_timeout)
        .await?;
    page.scroll_into_view(NEWSLETTER_FORM).await?;
    ensure!(
        page.is_in_viewport(NEWSLETTER_FORM).await?,
        "newsletter form not in viewport after scrolling into view",
    );
    Ok(())
}

async fn rejects_invalid_formats(
    config: Arc<SuiteConfig>,
    session: Arc<BrowserSession>,
    ctx: CaseContext,
) -> anyhow::Result<()> {
    let page = open_home(&session, &config).await?;

    for email in invalid_emails() {
        ctx.step(format!("submitting {:?}", email), async {
            fill_email_and_submit(&page, &config, &email, false).await
        })
        .await?;
    }
    Ok(())
}

async fn rejects_malicious_input(
    config: Arc<SuiteConfig>,
    session: Arc<BrowserSession>,
    ctx: CaseContext,
) -> anyhow::Result<()> {
    let page = open_home(&session, &config).await?;

    for payload in malicious_inputs() {
        ctx.step(format!("submitting {:?}", payload), async {
            page.fill(EMAIL_INPUT, payload).await?;
            page.click(SUBMIT_BUTTON).await?;
            verify_error_state(&page, &config).await
        })
        .await?;
    }
    Ok(())
}

async fn keyboard_empty_is_invalid(
    config: Arc<SuiteConfig>,
    session: Arc<BrowserSession>,
    _ctx: CaseContext,
) -> anyhow::Result<()> {
    let page = open_home(&session, &config).await?;

    page.focus(EMAIL_INPUT).await?;
    page.press(Key::Tab).await?;
    page.press(Key::Enter).await?;

    verify_error_state(&page, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_email_shape_and_uniqueness() {
        let a = random_email();
        let b = random_email();

        assert!(a.ends_with("@new.com"));
        assert_ne!(a, b);
        // uuid simple form: 32 hex chars before the domain
        assert_eq!(a.split('@').next().unwrap().len(), 32);
    }

    #[test]
    fn test_invalid_corpus_includes_overlong_local_part() {
        let corpus = invalid_emails();

        assert!(corpus.contains(&String::new()));
        let overlong = format!("{}@new.com", "a".repeat(65));
        assert!(corpus.contains(&overlong));
        assert_eq!(overlong.split('@').next().unwrap().len(), 65);
    }

    #[test]
    fn test_malicious_corpus_is_markup() {
        for payload in malicious_inputs() {
            assert!(payload.contains('<'));
        }
    }
}
