//! Rendering fallback: a headless Chrome that takes over when a static
//! fetch fails. The browser launches lazily on first use and every render
//! goes through one reused tab behind a mutex. One surface, one navigation
//! at a time; callers queue.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task;

use crate::config::RenderConfig;

const STEALTH_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
window.chrome = { runtime: {} };
"#;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid browser configuration: {0}")]
    Config(String),
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("failed to open tab: {0}")]
    Tab(String),
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
    #[error("timed out waiting for `{selector}` after {waited_ms}ms")]
    Timeout { selector: String, waited_ms: u64 },
    #[error("failed to capture page HTML: {0}")]
    Snapshot(String),
    #[error("render task failed: {0}")]
    Join(String),
}

/// Renderer seam: JS-capable fallback for pages a static fetch cannot
/// serve. Production is [`ChromeRenderer`]; tests inject fakes.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `url` and return the resulting HTML. With a `wait_selector`,
    /// the page only counts as loaded once that element's text is
    /// non-empty, within the configured poll budget.
    async fn render(&self, url: &str, wait_selector: Option<&str>) -> Result<String, RenderError>;
}

struct RenderSurface {
    /// Held so the Chrome process outlives the tab.
    _browser: Browser,
    tab: Arc<Tab>,
}

/// A rendered page counts as loaded once the wait selector's text is
/// non-empty. Unparseable selectors pass immediately rather than burning
/// the whole poll budget on a descriptor typo.
pub(crate) fn wait_satisfied(html: &str, selector: &str) -> bool {
    let doc = scraper::Html::parse_document(html);
    match scraper::Selector::parse(selector) {
        Ok(parsed) => doc
            .select(&parsed)
            .next()
            .map(|el| el.text().any(|t| !t.trim().is_empty()))
            .unwrap_or(false),
        Err(e) => {
            log::debug!("invalid ajax selector `{selector}`: {e}");
            true
        }
    }
}

fn launch_surface(config: &RenderConfig, user_agent: &str) -> Result<RenderSurface, RenderError> {
    let ua_arg = format!("--user-agent={user_agent}");
    let mut args: Vec<&OsStr> = vec![
        OsStr::new("--disable-blink-features=AutomationControlled"),
        OsStr::new("--no-first-run"),
        OsStr::new("--no-default-browser-check"),
        OsStr::new("--disable-infobars"),
        OsStr::new(ua_arg.as_str()),
    ];
    if config.disable_images {
        args.push(OsStr::new("--blink-settings=imagesEnabled=false"));
    }
    let options = LaunchOptions::default_builder()
        .headless(config.headless)
        .window_size(Some((config.window_width, config.window_height)))
        .args(args)
        .build()
        .map_err(|e| RenderError::Config(e.to_string()))?;
    let browser = Browser::new(options).map_err(|e| RenderError::Launch(e.to_string()))?;
    let tab = browser.new_tab().map_err(|e| RenderError::Tab(e.to_string()))?;
    tab.set_default_timeout(Duration::from_secs(config.nav_timeout_secs));
    Ok(RenderSurface {
        _browser: browser,
        tab,
    })
}

async fn snapshot(tab: &Arc<Tab>) -> Result<String, RenderError> {
    let tab = Arc::clone(tab);
    task::spawn_blocking(move || {
        tab.get_content()
            .map_err(|e| RenderError::Snapshot(e.to_string()))
    })
    .await
    .map_err(|e| RenderError::Join(e.to_string()))?
}

/// Headless-Chrome renderer with a lazily launched, serialized surface.
pub struct ChromeRenderer {
    config: RenderConfig,
    user_agent: String,
    surface: Mutex<Option<RenderSurface>>,
}

impl ChromeRenderer {
    /// No browser is launched here; the first render pays that cost.
    pub fn new(config: RenderConfig, user_agent: String) -> Self {
        Self {
            config,
            user_agent,
            surface: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, url: &str, wait_selector: Option<&str>) -> Result<String, RenderError> {
        let mut guard = self.surface.lock().await;
        if guard.is_none() {
            let config = self.config.clone();
            let user_agent = self.user_agent.clone();
            let launched = task::spawn_blocking(move || launch_surface(&config, &user_agent))
                .await
                .map_err(|e| RenderError::Join(e.to_string()))??;
            *guard = Some(launched);
        }
        let Some(surface) = guard.as_ref() else {
            return Err(RenderError::Launch("browser unavailable".to_string()));
        };
        let tab = Arc::clone(&surface.tab);

        log::info!("rendering {url}");
        let target = url.to_string();
        let nav_tab = Arc::clone(&tab);
        let nav_timeout = Duration::from_secs(self.config.nav_timeout_secs);
        task::spawn_blocking(move || -> Result<(), RenderError> {
            nav_tab
                .navigate_to(&target)
                .map_err(|e| RenderError::Navigation {
                    url: target.clone(),
                    message: e.to_string(),
                })?;
            nav_tab
                .wait_until_navigated()
                .map_err(|e| RenderError::Navigation {
                    url: target.clone(),
                    message: e.to_string(),
                })?;
            if let Err(e) = nav_tab.evaluate(STEALTH_SCRIPT, false) {
                log::debug!("stealth script rejected: {e}");
            }
            nav_tab
                .wait_for_element_with_custom_timeout("body", nav_timeout)
                .map(|_| ())
                .map_err(|e| RenderError::Navigation {
                    url: target.clone(),
                    message: e.to_string(),
                })
        })
        .await
        .map_err(|e| RenderError::Join(e.to_string()))??;

        match wait_selector {
            None => {
                tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;
                snapshot(&tab).await
            }
            Some(selector) => {
                for attempt in 0..self.config.max_polls {
                    let html = snapshot(&tab).await?;
                    if wait_satisfied(&html, selector) {
                        log::debug!("ajax selector `{selector}` ready after {attempt} polls");
                        return Ok(html);
                    }
                    tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
                }
                Err(RenderError::Timeout {
                    selector: selector.to_string(),
                    waited_ms: u64::from(self.config.max_polls) * self.config.poll_interval_ms,
                })
            }
        }
    }
}
