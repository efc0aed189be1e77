// Real-browser integration tests. These launch a local Chromium and are
// ignored by default; run with `cargo test -- --ignored`.

use patrol_browser::{BrowserSession, Key, SessionConfig};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FORM_PAGE: &str = r#"<html><body style="margin: 0">
    <div style="height: 3000px">spacer</div>
    <form id="signup">
        <input type="email" id="email">
        <button type="submit" class="go">Sign up</button>
    </form>
    <script>
        const input = document.querySelector('#email');
        input.addEventListener('input', () => {
            input.className = input.value.includes('@') ? '' : 'invalid';
        });
    </script>
</body></html>"#;

async fn serve_form_page() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(FORM_PAGE),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
#[ignore = "requires a local Chromium"]
async fn fill_round_trips_and_fires_input_events() {
    let server = serve_form_page().await;
    let session = BrowserSession::launch(SessionConfig::default())
        .await
        .unwrap();

    let page = session.new_page().await.unwrap();
    page.goto(&server.uri()).await.unwrap();

    page.fill("#email", "user@new.com").await.unwrap();
    assert_eq!(page.value_of("#email").await.unwrap(), "user@new.com");
    assert_eq!(page.class_of("#email").await.unwrap(), "");

    page.fill("#email", "not-an-email").await.unwrap();
    page.wait_for_class("#email", &["invalid", "error"], Duration::from_secs(10))
        .await
        .unwrap();

    session.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a local Chromium"]
async fn reload_resets_the_field_and_form_scrolls_into_view() {
    let server = serve_form_page().await;
    let session = BrowserSession::launch(SessionConfig::default())
        .await
        .unwrap();

    let page = session.new_page().await.unwrap();
    page.goto(&server.uri()).await.unwrap();

    page.fill("#email", "user@new.com").await.unwrap();
    page.clear_local_storage().await.unwrap();
    page.reload().await.unwrap();

    assert_eq!(page.value_of("#email").await.unwrap(), "");

    // Below a 3000px spacer, so not in the viewport until scrolled.
    assert!(!page.is_in_viewport("#signup").await.unwrap());
    page.scroll_into_view("#signup").await.unwrap();
    assert!(page.is_in_viewport("#signup").await.unwrap());

    session.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a local Chromium"]
async fn keyboard_tab_and_enter_reach_the_page() {
    let server = serve_form_page().await;
    let session = BrowserSession::launch(SessionConfig::default())
        .await
        .unwrap();

    let page = session.new_page().await.unwrap();
    page.goto(&server.uri()).await.unwrap();

    page.focus("#email").await.unwrap();
    page.type_text("#email", "user@new.com").await.unwrap();
    page.press(Key::Tab).await.unwrap();
    page.press(Key::Enter).await.unwrap();

    assert_eq!(page.value_of("#email").await.unwrap(), "user@new.com");

    session.close().await.unwrap();
}
