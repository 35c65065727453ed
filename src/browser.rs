use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::config::BrowserConfig;
use crate::error::{Error, Result};
use crate::page::Page;
use crate::stealth;

/// Flags for a lean form run; none of them change page behaviour.
const BASE_FLAGS: &[&str] = &[
    "disable-gpu",
    "disable-extensions",
    "metrics-recording-only",
    "mute-audio",
    "no-default-browser-check",
    "disable-client-side-phishing-detection",
    "disable-prompt-on-repost",
];

/// A command-line switch, written without its leading `--`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LaunchArg {
    Flag(&'static str),
    Pair(&'static str, &'static str),
}

fn launch_args(config: &BrowserConfig) -> Vec<LaunchArg> {
    let mut args: Vec<LaunchArg> = BASE_FLAGS.iter().copied().map(LaunchArg::Flag).collect();
    if config.stealth {
        args.extend(stealth::stealth_key_args().into_iter().map(LaunchArg::Flag));
        args.extend(
            stealth::stealth_kv_args()
                .into_iter()
                .map(|(key, value)| LaunchArg::Pair(key, value)),
        );
    }
    args
}

fn chrome_config(config: &BrowserConfig) -> Result<CrBrowserConfig> {
    let mode = CrBrowserConfig::builder();
    let mode = if config.headless {
        mode.new_headless_mode()
    } else {
        mode.with_head()
    };

    let mut builder = launch_args(config)
        .into_iter()
        .fold(mode.no_sandbox(), |builder, arg| match arg {
            LaunchArg::Flag(flag) => builder.arg(flag),
            LaunchArg::Pair(key, value) => builder.arg((key, value)),
        })
        .viewport(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: false,
            has_touch: false,
        });
    if let Some(path) = &config.chrome_path {
        builder = builder.chrome_executable(path);
    }

    builder.build().map_err(Error::LaunchError)
}

/// One launched Chrome process and the task pumping its CDP connection.
pub struct AgenticBrowser {
    browser: CrBrowser,
    stealth: bool,
    default_timeout: std::time::Duration,
    handler_task: JoinHandle<()>,
}

impl AgenticBrowser {
    /// Start Chrome and keep its event stream drained in the background.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let (browser, mut handler) = CrBrowser::launch(chrome_config(config)?)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        tracing::debug!(headless = config.headless, stealth = config.stealth, "browser launched");
        Ok(Self {
            browser,
            stealth: config.stealth,
            default_timeout: config.default_timeout,
            handler_task,
        })
    }

    /// Open a blank tab. Stealth scripts, when enabled, are registered before
    /// anything navigates so they run ahead of site code.
    pub async fn new_blank_page(&self) -> Result<Page> {
        let cr_page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;

        if self.stealth {
            stealth::apply_stealth(&cr_page).await?;
        }

        Ok(Page::new(cr_page, self.default_timeout))
    }

    /// Shut the browser process down and stop the handler task.
    pub async fn close(&mut self) -> Result<()> {
        let closed = self.browser.close().await;
        let waited = self.browser.wait().await;
        self.handler_task.abort();
        closed?;
        waited?;
        Ok(())
    }
}
