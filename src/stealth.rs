use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::page::Page as CrPage;

use crate::error::{Error, Result};

/// Launch flags without a value. chromiumoxide adds the `--` prefix itself.
pub fn stealth_key_args() -> Vec<&'static str> {
    vec![
        "disable-infobars",
        "disable-default-apps",
        "no-first-run",
    ]
}

/// Launch flags of the form `--key=value`.
pub fn stealth_kv_args() -> Vec<(&'static str, &'static str)> {
    vec![("disable-blink-features", "AutomationControlled")]
}

/// Register the evasion script so it runs before any site script on every document.
pub async fn apply_stealth(page: &CrPage) -> Result<()> {
    page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_JS))
        .await
        .map_err(|e| Error::JsError(format!("Failed to inject stealth scripts: {e}")))?;
    Ok(())
}

/// Masks the most commonly probed automation fingerprints.
static STEALTH_JS: &str = r#"
Object.defineProperty(Navigator.prototype, 'webdriver', {
    get: () => false,
    configurable: true,
});

Object.defineProperty(navigator, 'languages', {
    get: () => ['en-US', 'en'],
    configurable: true,
});

if (navigator.plugins.length === 0) {
    Object.defineProperty(navigator, 'plugins', {
        get: () => Object.setPrototypeOf([
            { name: 'PDF Viewer', filename: 'internal-pdf-viewer', description: 'Portable Document Format' },
            { name: 'Chrome PDF Viewer', filename: 'internal-pdf-viewer', description: 'Portable Document Format' },
        ], PluginArray.prototype),
        configurable: true,
    });
}

if (!window.chrome) {
    window.chrome = { runtime: {}, loadTimes: () => ({}), csi: () => ({}) };
}

const queryPermission = window.Permissions && window.Permissions.prototype.query;
if (queryPermission) {
    window.Permissions.prototype.query = function(parameters) {
        return parameters && parameters.name === 'notifications'
            ? Promise.resolve({ state: Notification.permission })
            : queryPermission.call(this, parameters);
    };
}
"#;
