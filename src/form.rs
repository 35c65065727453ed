//! Form discovery and filling on a session's page.
//!
//! Only the first `<form>` in document order is considered, and only its
//! `<input>` descendants. Inspection hands out a `ref` per input; filling
//! prefers that ref and falls back to position when the ref is absent or its
//! element is no longer in the page.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::element::Element;
use crate::error::{Error, Result};
use crate::page::Page;
use crate::session::SessionStore;

const FORM_SELECTOR: &str = "form";
const INPUT_SELECTOR: &str = "input";
const SUBMIT_SELECTOR: &str =
    "button:not([type='button']):not([type='reset']), input[type='submit']";

/// Attributes of one form input, as read from the live page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InputDescriptor {
    pub name: String,
    /// Declared `type` attribute, empty when absent.
    #[serde(rename = "type")]
    pub input_type: String,
    pub id: String,
    pub placeholder: String,
    /// Current value, or the value to type when filling.
    pub value: String,
    /// Handle of the element this descriptor was read from.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub element_ref: Option<String>,
}

/// Viewport coordinates of the form's centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillOutcome {
    pub message: String,
    pub inputs_typed: usize,
}

/// Read every input of the first form on the page.
///
/// The session remembers the inspected elements so a later [`fill_form`] can
/// address them by `ref` even if the DOM around them shifts.
pub async fn find_form_and_inputs(
    store: &SessionStore,
    session_id: &str,
) -> Result<Vec<InputDescriptor>> {
    let session = store.require(session_id).await?;
    let mut session = session.lock().await;

    let form = first_form(session.page()).await?;
    let inputs = form_inputs(&form).await?;

    let mut descriptors = Vec::with_capacity(inputs.len());
    let mut refs = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        let element_ref = format!("input-{index}");
        descriptors.push(read_descriptor(&input, &element_ref).await?);
        refs.push((element_ref, input));
    }
    session.set_element_refs(refs);

    info!(session_id, inputs = descriptors.len(), "form inspected");
    Ok(descriptors)
}

/// Type each descriptor's value into its input, then click the form's submit control.
///
/// `descriptors` must have one entry per input currently in the form; a
/// mismatch fails before anything is typed. Inputs that cannot take focus,
/// such as hidden or disabled ones, are skipped. Inputs typed before a later
/// failure stay typed.
pub async fn fill_form(
    store: &SessionStore,
    session_id: &str,
    descriptors: &[InputDescriptor],
) -> Result<FillOutcome> {
    let session = store.require(session_id).await?;
    let session = session.lock().await;
    let page = session.page();

    page.wait_for_selector(FORM_SELECTOR).await?;
    let form = first_form(page).await?;
    let inputs = form_inputs(&form).await?;

    if descriptors.len() != inputs.len() {
        return Err(Error::InputCountMismatch {
            inputs: inputs.len(),
            supplied: descriptors.len(),
        });
    }

    let mut inputs_typed = 0;
    for (index, (descriptor, positional)) in descriptors.iter().zip(&inputs).enumerate() {
        if descriptor.value.is_empty() {
            continue;
        }
        let target = match descriptor
            .element_ref
            .as_deref()
            .and_then(|element_ref| session.element_ref(element_ref))
        {
            Some(element) if element.is_attached().await => element,
            Some(_) => {
                debug!(index, "inspected element is gone, filling by position");
                positional
            }
            None => positional,
        };

        target.focus().await?;
        // keystrokes go to the focused element, which is not `target` if it refused focus
        if !target.has_focus().await? {
            debug!(index, name = %descriptor.name, "input cannot take focus, skipped");
            continue;
        }
        target.type_text(&descriptor.value).await?;
        inputs_typed += 1;
        debug!(index, name = %descriptor.name, "value typed");
    }

    let submit = form
        .find_element(SUBMIT_SELECTOR)
        .await
        .map_err(|_| Error::ElementNotFound("no submit button in the form".into()))?;
    submit.click().await?;

    info!(session_id, inputs_typed, "form submitted");
    Ok(FillOutcome {
        message: "Form filled successfully".to_string(),
        inputs_typed,
    })
}

/// Bring the first form into view and click its centre.
pub async fn scroll_to_form(store: &SessionStore, session_id: &str) -> Result<FormPosition> {
    let session = store.require(session_id).await?;
    let session = session.lock().await;
    let page = session.page();

    let form = first_form(page).await?;
    form.scroll_into_view().await?;
    let (x, y) = form.center().await?;
    page.click_at(x, y).await?;

    debug!(session_id, x, y, "scrolled to form");
    Ok(FormPosition { x, y })
}

async fn first_form(page: &Page) -> Result<Element> {
    page.find_elements(FORM_SELECTOR)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::ElementNotFound("no form found on the page".into()))
}

async fn form_inputs(form: &Element) -> Result<Vec<Element>> {
    let inputs = form.find_elements(INPUT_SELECTOR).await?;
    if inputs.is_empty() {
        return Err(Error::ElementNotFound("no input found in the form".into()));
    }
    Ok(inputs)
}

async fn read_descriptor(input: &Element, element_ref: &str) -> Result<InputDescriptor> {
    Ok(InputDescriptor {
        name: input.attribute("name").await?.unwrap_or_default(),
        input_type: input.attribute("type").await?.unwrap_or_default(),
        id: input.attribute("id").await?.unwrap_or_default(),
        placeholder: input.attribute("placeholder").await?.unwrap_or_default(),
        value: input.property_string("value").await?,
        element_ref: Some(element_ref.to_string()),
    })
}
