//! End-to-end runs against a real Chrome. Pages are inline `data:` URLs, so no
//! network is needed, but a local Chrome/Chromium is: each test returns early
//! unless `CHROME_PATH` points at one.

use std::sync::Arc;
use std::time::Duration;

use form_agent::{
    close_browser, fill_form, find_form_and_inputs, generate_screenshot, open_webpage,
    prepare_dummy_data, scroll_to_form, BrowserBuilder, BrowserConfig, Error, SessionStore,
    Toolbox,
};
use serde_json::json;

const EMAIL_FORM: &str = r#"<html><head><title>signup</title></head><body>
<form onsubmit="event.preventDefault();document.title='sent:'+this.email.value">
<input type="email" name="email">
<input type="submit">
</form></body></html>"#;

const PROFILE_FORM: &str = r#"<html><body>
<form onsubmit="event.preventDefault();document.title='sent'">
<input type="text" name="full_name" id="full_name" placeholder="Name">
<input type="email" name="email" id="email" placeholder="Email">
<button type="submit">Go</button>
</form></body></html>"#;

const CSRF_FORM: &str = r#"<html><body>
<form onsubmit="event.preventDefault();document.title='sent'">
<input type="text" name="full_name">
<input type="email" name="email">
<input type="hidden" name="csrf" value="tok">
<button type="submit">Go</button>
</form></body></html>"#;

const TOGGLE_FORM: &str = r#"<html><body>
<form onsubmit="event.preventDefault();document.title='sent'">
<input type="password" name="password">
<button type="button" onclick="document.title='toggled'">Show</button>
<button>Go</button>
</form></body></html>"#;

fn data_url(html: &str) -> String {
    format!("data:text/html,{html}")
}

fn chrome_config() -> Option<BrowserConfig> {
    let Ok(path) = std::env::var("CHROME_PATH") else {
        eprintln!("CHROME_PATH not set, skipping browser test");
        return None;
    };
    Some(
        BrowserBuilder::new()
            .headless(true)
            .chrome_path(path)
            .timeout(Duration::from_secs(5))
            .screenshot_dir(std::env::temp_dir().join("form-agent-shots"))
            .build_config(),
    )
}

async fn eval_string(store: &SessionStore, session_id: &str, expression: &str) -> String {
    let session = store.require(session_id).await.expect("session");
    let session = session.lock().await;
    session
        .page()
        .inner()
        .evaluate(expression)
        .await
        .expect("evaluate")
        .into_value::<String>()
        .expect("string result")
}

/// Poll `expression` until it yields `expected`, tolerating the gaps while a
/// document is being replaced.
async fn wait_for_value(
    store: &SessionStore,
    session_id: &str,
    expression: &str,
    expected: &str,
) -> String {
    let mut last = String::new();
    for _ in 0..30 {
        let session = store.require(session_id).await.expect("session");
        let value = session
            .lock()
            .await
            .page()
            .inner()
            .evaluate(expression)
            .await
            .ok()
            .and_then(|result| result.into_value::<String>().ok());
        if let Some(value) = value {
            last = value;
            if last == expected {
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    last
}

#[tokio::test]
async fn test_inspect_generate_fill_submit() {
    let Some(config) = chrome_config() else { return };
    let store = SessionStore::new();
    let opened = open_webpage(&store, &config, &data_url(EMAIL_FORM))
        .await
        .expect("Failed to open page");
    assert_eq!(opened.title, "signup");
    let id = opened.session_id.as_str();

    let inputs = find_form_and_inputs(&store, id).await.expect("Failed to inspect form");
    let types: Vec<_> = inputs.iter().map(|i| i.input_type.as_str()).collect();
    assert_eq!(types, ["email", "submit"]);
    assert!(inputs.iter().all(|i| i.value.is_empty()));

    let inputs = prepare_dummy_data(inputs);
    assert_eq!(inputs[0].value, "test@example.com");
    assert_eq!(inputs[1].value, "test");

    let outcome = fill_form(&store, id, &inputs).await.expect("Failed to fill form");
    assert_eq!(outcome.message, "Form filled successfully");
    assert_eq!(outcome.inputs_typed, 2);

    let title = wait_for_value(&store, id, "document.title", "sent:test@example.com").await;
    assert_eq!(title, "sent:test@example.com");

    close_browser(&store, id).await.expect("Failed to close");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let Some(config) = chrome_config() else { return };
    let toolbox = Toolbox::new(Arc::new(SessionStore::new()), config);

    let first = toolbox
        .call("openWebpageTool", json!({ "url": data_url(EMAIL_FORM) }))
        .await
        .expect("Failed to open first page");
    let second = toolbox
        .call("openWebpageTool", json!({ "url": data_url(PROFILE_FORM) }))
        .await
        .expect("Failed to open second page");
    assert_ne!(first, second);

    let first_inputs = toolbox
        .call("findFormAndInputsTool", json!({ "sessionId": first }))
        .await
        .expect("Failed to inspect first page");
    let second_inputs = toolbox
        .call("findFormAndInputsTool", json!({ "sessionId": second }))
        .await
        .expect("Failed to inspect second page");

    assert_eq!(first_inputs["inputDetails"].as_array().unwrap().len(), 2);
    assert_eq!(first_inputs["inputDetails"][1]["type"], "submit");
    assert_eq!(second_inputs["inputDetails"][0]["name"], "full_name");
    assert_eq!(second_inputs["inputDetails"][1]["placeholder"], "Email");

    toolbox.store().close_all().await;
}

#[tokio::test]
async fn test_page_without_form() {
    let Some(config) = chrome_config() else { return };
    let store = SessionStore::new();
    let opened = open_webpage(&store, &config, &data_url("<h1>Nothing here</h1>"))
        .await
        .expect("Failed to open page");

    let err = find_form_and_inputs(&store, &opened.session_id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ElementNotFound(_)), "{err}");

    let err = scroll_to_form(&store, &opened.session_id).await.unwrap_err();
    assert!(matches!(err, Error::ElementNotFound(_)), "{err}");

    close_browser(&store, &opened.session_id).await.unwrap();
}

#[tokio::test]
async fn test_form_without_inputs() {
    let Some(config) = chrome_config() else { return };
    let store = SessionStore::new();
    let opened = open_webpage(&store, &config, &data_url("<form><button>x</button></form>"))
        .await
        .expect("Failed to open page");
    let id = opened.session_id.as_str();

    let err = find_form_and_inputs(&store, id).await.unwrap_err();
    assert!(matches!(err, Error::ElementNotFound(_)), "{err}");

    let err = fill_form(&store, id, &[]).await.unwrap_err();
    assert!(matches!(err, Error::ElementNotFound(_)), "{err}");

    close_browser(&store, id).await.unwrap();
}

#[tokio::test]
async fn test_navigation_timeout() {
    let Some(config) = chrome_config() else { return };
    let config = BrowserConfig {
        navigation_timeout: Duration::from_secs(1),
        ..config
    };
    let store = SessionStore::new();

    let err = open_webpage(&store, &config, &data_url("<script>while (true) {}</script>"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout(_)), "{err}");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_short_input_list_is_rejected() {
    let Some(config) = chrome_config() else { return };
    let store = SessionStore::new();
    let opened = open_webpage(&store, &config, &data_url(PROFILE_FORM))
        .await
        .expect("Failed to open page");
    let id = opened.session_id.as_str();

    let mut inputs = prepare_dummy_data(find_form_and_inputs(&store, id).await.unwrap());
    inputs.truncate(1);

    let err = fill_form(&store, id, &inputs).await.unwrap_err();
    assert!(
        matches!(err, Error::InputCountMismatch { inputs: 2, supplied: 1 }),
        "{err}"
    );
    let typed = eval_string(&store, id, "document.forms[0].elements.full_name.value").await;
    assert_eq!(typed, "");

    close_browser(&store, id).await.unwrap();
}

#[tokio::test]
async fn test_unfocusable_input_is_skipped() {
    let Some(config) = chrome_config() else { return };
    let store = SessionStore::new();
    let opened = open_webpage(&store, &config, &data_url(CSRF_FORM))
        .await
        .expect("Failed to open page");
    let id = opened.session_id.as_str();

    let inputs = prepare_dummy_data(find_form_and_inputs(&store, id).await.unwrap());
    assert_eq!(inputs[2].input_type, "hidden");
    assert_eq!(inputs[2].value, "tok");

    let outcome = fill_form(&store, id, &inputs).await.expect("Failed to fill form");
    assert_eq!(outcome.inputs_typed, 2);

    let email = eval_string(&store, id, "document.forms[0].elements.email.value").await;
    let csrf = eval_string(&store, id, "document.forms[0].elements.csrf.value").await;
    assert_eq!(email, "test@example.com");
    assert_eq!(csrf, "tok");
    assert_eq!(wait_for_value(&store, id, "document.title", "sent").await, "sent");

    close_browser(&store, id).await.unwrap();
}

#[tokio::test]
async fn test_plain_button_is_not_submit() {
    let Some(config) = chrome_config() else { return };
    let store = SessionStore::new();
    let opened = open_webpage(&store, &config, &data_url(TOGGLE_FORM))
        .await
        .expect("Failed to open page");
    let id = opened.session_id.as_str();

    let inputs = prepare_dummy_data(find_form_and_inputs(&store, id).await.unwrap());
    fill_form(&store, id, &inputs).await.expect("Failed to fill form");

    assert_eq!(wait_for_value(&store, id, "document.title", "sent").await, "sent");

    close_browser(&store, id).await.unwrap();
}

#[tokio::test]
async fn test_fill_follows_refs_after_reorder() {
    let Some(config) = chrome_config() else { return };
    let store = SessionStore::new();
    let opened = open_webpage(&store, &config, &data_url(PROFILE_FORM))
        .await
        .expect("Failed to open page");
    let id = opened.session_id.as_str();

    let inputs = prepare_dummy_data(find_form_and_inputs(&store, id).await.unwrap());

    {
        let session = store.require(id).await.unwrap();
        let session = session.lock().await;
        session
            .page()
            .evaluate_void(
                "(() => { const f = document.forms[0]; \
                 f.insertBefore(f.elements.email, f.elements.full_name); })()",
            )
            .await
            .unwrap();
    }

    fill_form(&store, id, &inputs).await.expect("Failed to fill form");

    let email = eval_string(&store, id, "document.forms[0].elements.email.value").await;
    let name = eval_string(&store, id, "document.forms[0].elements.full_name.value").await;
    assert_eq!(email, "test@example.com");
    assert_eq!(name, "test");

    close_browser(&store, id).await.unwrap();
}

#[tokio::test]
async fn test_fill_again_after_page_replaced() {
    let Some(config) = chrome_config() else { return };
    let store = SessionStore::new();
    let opened = open_webpage(&store, &config, &data_url(PROFILE_FORM))
        .await
        .expect("Failed to open page");
    let id = opened.session_id.as_str();

    let inputs = prepare_dummy_data(find_form_and_inputs(&store, id).await.unwrap());
    fill_form(&store, id, &inputs).await.expect("Failed to fill form");

    {
        let session = store.require(id).await.unwrap();
        let session = session.lock().await;
        session
            .page()
            .navigate(
                &data_url(&PROFILE_FORM.replace("Go", "Again")),
                Duration::from_secs(5),
            )
            .await
            .expect("Failed to reload");
    }
    let email_js = "document.forms[0].elements.email.value";
    assert_eq!(wait_for_value(&store, id, email_js, "").await, "");

    // refs from the first inspection point into the discarded document
    fill_form(&store, id, &inputs)
        .await
        .expect("Failed to fill replaced form");
    assert_eq!(eval_string(&store, id, email_js).await, "test@example.com");

    close_browser(&store, id).await.unwrap();
}

#[tokio::test]
async fn test_screenshot_and_close() {
    let Some(config) = chrome_config() else { return };
    let toolbox = Toolbox::new(Arc::new(SessionStore::new()), config);
    let session_id = toolbox
        .call("openWebpageTool", json!({ "url": data_url(PROFILE_FORM) }))
        .await
        .expect("Failed to open page");

    let position = toolbox
        .call("scrollToFormTool", json!({ "sessionId": session_id }))
        .await
        .expect("Failed to scroll to form");
    assert!(position["formPosition"]["x"].as_f64().unwrap() > 0.0);

    let path = toolbox
        .call("generateScreenshotTool", json!({ "sessionId": session_id }))
        .await
        .expect("Failed to take screenshot");
    let path = path.as_str().unwrap();
    assert!(path.ends_with(".jpeg"));
    let bytes = std::fs::read(path).expect("screenshot file");
    assert_eq!(&bytes[0..3], &[0xFF, 0xD8, 0xFF]);
    std::fs::remove_file(path).ok();

    toolbox
        .call("closeBrowserTool", json!({ "sessionId": session_id }))
        .await
        .expect("Failed to close");
    let err = toolbox
        .call("findFormAndInputsTool", json!({ "sessionId": session_id }))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SessionNotFound(_)));
}

#[tokio::test]
async fn test_screenshot_for_direct_session() {
    let Some(config) = chrome_config() else { return };
    let store = SessionStore::new();
    let opened = open_webpage(&store, &config, &data_url(EMAIL_FORM)).await.unwrap();

    let path = generate_screenshot(&store, &config, &opened.session_id)
        .await
        .expect("Failed to take screenshot");
    assert!(path.is_absolute());
    assert!(path.exists());
    std::fs::remove_file(&path).ok();

    close_browser(&store, &opened.session_id).await.unwrap();
}
