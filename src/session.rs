//! Session registry: maps a session id to the browser and page it owns.
//!
//! The store is an ordinary value handed to every operation. Each session sits
//! behind its own mutex so work on one session never blocks another.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::browser::AgenticBrowser;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::page::Page;

pub type SessionHandle = Arc<Mutex<Session>>;

/// One browser instance and its single page.
pub struct Session {
    id: String,
    browser: AgenticBrowser,
    page: Page,
    /// Input elements captured by the most recent form inspection, keyed by ref.
    element_refs: HashMap<String, Element>,
}

impl Session {
    pub fn new(id: impl Into<String>, browser: AgenticBrowser, page: Page) -> Self {
        Self {
            id: id.into(),
            browser,
            page,
            element_refs: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Replace the remembered input handles with a fresh set.
    pub fn set_element_refs(&mut self, refs: impl IntoIterator<Item = (String, Element)>) {
        self.element_refs = refs.into_iter().collect();
    }

    pub fn element_ref(&self, element_ref: &str) -> Option<&Element> {
        self.element_refs.get(element_ref)
    }

    /// Drop element handles and shut the browser down.
    pub async fn close(&mut self) -> Result<()> {
        tracing::debug!(session_id = %self.id(), "closing browser");
        self.element_refs.clear();
        self.browser.close().await
    }
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh random session id.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Register a session, replacing any existing entry under the same id.
    /// The displaced session, if any, is returned still open.
    pub async fn create(
        &self,
        id: impl Into<String>,
        browser: AgenticBrowser,
        page: Page,
    ) -> Option<SessionHandle> {
        let id = id.into();
        let session = Arc::new(Mutex::new(Session::new(id.clone(), browser, page)));
        self.sessions.write().await.insert(id, session)
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Like [`get`](Self::get), but an unknown id is an error.
    pub async fn require(&self, id: &str) -> Result<SessionHandle> {
        self.get(id)
            .await
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }

    pub async fn remove(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.write().await.remove(id)
    }

    pub async fn ids(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Remove and close every session. Failures are logged, not returned.
    pub async fn close_all(&self) {
        let drained: Vec<(String, SessionHandle)> =
            self.sessions.write().await.drain().collect();
        for (id, session) in drained {
            if let Err(e) = session.lock().await.close().await {
                tracing::warn!(session_id = %id, error = %e, "failed to close browser");
            }
        }
    }
}
