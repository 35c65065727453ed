use std::path::PathBuf;
use std::time::Duration;

/// Desktop Chrome on Windows, matching what form pages expect from a real visitor.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.212 Safari/537.36";

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    pub stealth: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_path: Option<String>,
    pub user_agent: String,
    /// Upper bound for reaching DOMContentLoaded after navigation (default: 5s).
    pub navigation_timeout: Duration,
    /// How long to wait for `readyState == "complete"` once the DOM is loaded (default: 2s).
    /// Running out is not an error.
    pub settle_timeout: Duration,
    /// Default timeout for operations like `wait_for_selector` (default: 30s).
    pub default_timeout: Duration,
    /// Screenshot output directory; relative paths resolve against the working directory.
    pub screenshot_dir: PathBuf,
    /// JPEG quality, 0-100.
    pub screenshot_quality: u8,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            stealth: true,
            viewport_width: 1280,
            viewport_height: 720,
            chrome_path: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            navigation_timeout: Duration::from_secs(5),
            settle_timeout: Duration::from_secs(2),
            default_timeout: Duration::from_secs(30),
            screenshot_dir: PathBuf::from("screenshots"),
            screenshot_quality: 60,
        }
    }
}

pub struct BrowserBuilder {
    config: BrowserConfig,
}

impl BrowserBuilder {
    pub fn new() -> Self {
        Self {
            config: BrowserConfig::default(),
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn stealth(mut self, stealth: bool) -> Self {
        self.config.stealth = stealth;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.config.navigation_timeout = timeout;
        self
    }

    pub fn settle_timeout(mut self, timeout: Duration) -> Self {
        self.config.settle_timeout = timeout;
        self
    }

    /// Set the default timeout for operations like `wait_for_selector`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    pub fn screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.screenshot_dir = dir.into();
        self
    }

    /// Values above 100 are clamped.
    pub fn screenshot_quality(mut self, quality: u8) -> Self {
        self.config.screenshot_quality = quality.min(100);
        self
    }

    pub fn build_config(self) -> BrowserConfig {
        self.config
    }
}

impl Default for BrowserBuilder {
    fn default() -> Self {
        Self::new()
    }
}
