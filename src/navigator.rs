use serde::Serialize;
use tracing::{debug, info, warn};

use crate::browser::AgenticBrowser;
use crate::config::BrowserConfig;
use crate::error::{Error, Result};
use crate::page::{Page, ReadyState};
use crate::session::SessionStore;

/// What a successful [`open_webpage`] registered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedSession {
    pub session_id: String,
    pub url: String,
    pub title: String,
}

/// Launch a browser, load `url` in a fresh page and register the pair as a new session.
///
/// Returns once DOMContentLoaded fires (bounded by `navigation_timeout`) and the
/// document has had up to `settle_timeout` to finish loading. The browser is
/// closed again if anything after launch fails.
pub async fn open_webpage(
    store: &SessionStore,
    config: &BrowserConfig,
    url: &str,
) -> Result<OpenedSession> {
    info!(url, "opening webpage");
    let mut browser = AgenticBrowser::launch(config).await?;

    let page = match prepare_page(&browser, config, url).await {
        Ok(page) => page,
        Err(e) => {
            if let Err(close_err) = browser.close().await {
                warn!(error = %close_err, "failed to close browser after navigation error");
            }
            return Err(e);
        }
    };

    let opened = OpenedSession {
        session_id: SessionStore::generate_id(),
        url: page.url().await.unwrap_or_else(|_| url.to_string()),
        title: page.title().await.unwrap_or_default(),
    };

    if store
        .create(opened.session_id.clone(), browser, page)
        .await
        .is_some()
    {
        warn!(session_id = %opened.session_id, "session id collision, previous session replaced");
    }

    info!(session_id = %opened.session_id, title = %opened.title, "session registered");
    Ok(opened)
}

async fn prepare_page(browser: &AgenticBrowser, config: &BrowserConfig, url: &str) -> Result<Page> {
    let page = browser.new_blank_page().await?;
    page.set_user_agent(&config.user_agent).await?;
    page.navigate(url, config.navigation_timeout).await?;

    if !page
        .wait_for_ready_state(ReadyState::Complete, config.settle_timeout)
        .await
    {
        debug!(url, "page still loading after settle timeout, continuing");
    }
    Ok(page)
}

/// Forget the id and close the session's browser.
pub async fn close_browser(store: &SessionStore, session_id: &str) -> Result<()> {
    let session = store
        .remove(session_id)
        .await
        .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?;
    session.lock().await.close().await?;
    info!(session_id, "session closed");
    Ok(())
}
