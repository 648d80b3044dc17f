/// Renderer tests against a real browser.
/// These tests require Chrome/Chromium to be installed.
/// Run with: cargo test --test render_tests -- --ignored
use webnovel_sources::{ChromeRenderer, RenderConfig, RenderError, Renderer};

fn fast_config() -> RenderConfig {
    RenderConfig {
        nav_timeout_secs: 15,
        poll_interval_ms: 200,
        max_polls: 5,
        settle_ms: 200,
        ..RenderConfig::default()
    }
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium and internet
async fn renders_a_static_page() {
    let renderer = ChromeRenderer::new(fast_config(), "Mozilla/5.0 (test)".to_string());

    let html = renderer
        .render("https://example.com", None)
        .await
        .expect("Chrome/Chromium not installed?");

    assert!(html.contains("<html"), "snapshot should be full HTML");
    assert!(html.contains("Example Domain"), "page content not as expected");
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium and internet
async fn waits_for_a_selector_that_exists() {
    let renderer = ChromeRenderer::new(fast_config(), "Mozilla/5.0 (test)".to_string());

    let html = renderer
        .render("https://example.com", Some("h1"))
        .await
        .expect("Chrome/Chromium not installed?");

    assert!(html.contains("Example Domain"));
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium and internet
async fn missing_selector_times_out_with_the_wait_budget() {
    let renderer = ChromeRenderer::new(fast_config(), "Mozilla/5.0 (test)".to_string());

    let err = renderer
        .render("https://example.com", Some("div.does-not-exist"))
        .await
        .expect_err("a selector example.com never renders should time out");

    match err {
        RenderError::Timeout { selector, waited_ms } => {
            assert_eq!(selector, "div.does-not-exist");
            assert_eq!(waited_ms, 1000, "5 polls at 200ms each");
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium and internet
async fn browser_is_reused_across_renders() {
    let renderer = ChromeRenderer::new(fast_config(), "Mozilla/5.0 (test)".to_string());

    let first = renderer.render("https://example.com", None).await;
    let second = renderer.render("https://example.com", None).await;

    assert!(first.is_ok(), "first render failed: {first:?}");
    assert!(second.is_ok(), "second render failed: {second:?}");
}
