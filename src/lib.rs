pub mod browser;
pub mod config;
pub mod dummy;
pub mod element;
pub mod error;
pub mod form;
pub mod navigator;
pub mod page;
pub mod screenshot;
pub mod session;
pub mod stealth;
pub mod tools;

pub use browser::AgenticBrowser;
pub use config::{BrowserBuilder, BrowserConfig};
pub use dummy::{dummy_value_for, prepare_dummy_data};
pub use error::{Error, ErrorKind, Result};
pub use form::{
    fill_form, find_form_and_inputs, scroll_to_form, FillOutcome, FormPosition, InputDescriptor,
};
pub use navigator::{close_browser, open_webpage, OpenedSession};
pub use screenshot::generate_screenshot;
pub use session::{Session, SessionStore};
pub use tools::{Tool, ToolDefinition, Toolbox};
