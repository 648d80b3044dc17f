use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Engine configuration, read from `config.toml` when present.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// User agent presented by both the HTTP client and the renderer.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Timeout for HTTP requests in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Enable cookie support
    #[serde(default = "default_true")]
    pub enable_cookies: bool,

    /// Enable gzip/brotli compression
    #[serde(default = "default_true")]
    pub enable_compression: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// Browser headless mode
    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Navigation timeout in seconds
    #[serde(default = "default_nav_timeout")]
    pub nav_timeout_secs: u64,

    /// Delay between ajax-wait polls in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Hard ceiling on ajax-wait polls per render
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,

    /// Settle delay after navigation when no ajax wait is configured
    #[serde(default = "default_settle")]
    pub settle_ms: u64,

    /// Disable images in browser (faster loading)
    #[serde(default = "default_true")]
    pub disable_images: bool,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}
fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_window_width() -> u32 {
    1920
}
fn default_window_height() -> u32 {
    1080
}
fn default_nav_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    500
}
fn default_max_polls() -> u32 {
    20
}
fn default_settle() -> u64 {
    750
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            enable_cookies: true,
            enable_compression: true,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
            nav_timeout_secs: default_nav_timeout(),
            poll_interval_ms: default_poll_interval(),
            max_polls: default_max_polls(),
            settle_ms: default_settle(),
            disable_images: true,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            http: HttpConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read `config.toml` from the working directory, falling back to
    /// defaults when the file is absent or malformed.
    pub fn load() -> Self {
        let path = Path::new("config.toml");
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                match toml::from_str::<EngineConfig>(&content) {
                    Ok(cfg) => return cfg,
                    Err(e) => log::warn!("config.toml is invalid ({e}), using defaults"),
                }
            }
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = EngineConfig::default();
        assert!(cfg.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(cfg.http.timeout_secs, 30);
        assert!(cfg.http.enable_cookies);
        assert!(cfg.render.headless);
        assert_eq!(cfg.render.max_polls, 20);
        assert_eq!(cfg.render.poll_interval_ms, 500);
    }

    #[test]
    fn partial_toml_fills_the_rest_with_defaults() {
        let cfg: EngineConfig = toml::from_str(
            r#"
            [http]
            timeout_secs = 5

            [render]
            headless = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.http.timeout_secs, 5);
        assert!(cfg.http.enable_compression, "untouched fields keep defaults");
        assert!(!cfg.render.headless);
        assert_eq!(cfg.render.window_width, 1920);
        assert!(cfg.user_agent.starts_with("Mozilla/5.0"));
    }
}
