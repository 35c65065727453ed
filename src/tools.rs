//! Tool adapters: every operation as a named, schema-typed callable for an
//! external agent runtime.
//!
//! Arguments and results are JSON. Parameter schemas are generated from the
//! argument structs, so the schema and the deserializer cannot drift apart.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::BrowserConfig;
use crate::dummy::prepare_dummy_data;
use crate::error::{Error, Result};
use crate::form::{self, InputDescriptor};
use crate::navigator;
use crate::screenshot::{self, current_time_millis};
use crate::session::SessionStore;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// JSON schema of the accepted arguments object.
    fn parameters(&self) -> Value;
    async fn execute(&self, args: Value) -> Result<Value>;
}

/// Name, description and parameter schema, as advertised to the runtime.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// State shared by all adapters.
#[derive(Clone)]
pub struct ToolContext {
    pub store: Arc<SessionStore>,
    pub config: Arc<BrowserConfig>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct OpenWebpageArgs {
    /// Address of the page to open.
    pub url: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionArgs {
    /// Id returned by openWebpageTool.
    pub session_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NoArgs {}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InputDetailsArgs {
    /// Inputs as returned by findFormAndInputsTool.
    pub input_details: Vec<InputDescriptor>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FillFormArgs {
    /// Id returned by openWebpageTool.
    pub session_id: String,
    /// One entry per form input, in the order findFormAndInputsTool returned them.
    pub input_details: Vec<InputDescriptor>,
}

fn schema_of<T: JsonSchema>() -> Value {
    schemars::schema_for!(T).to_value()
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| Error::InvalidArguments(e.to_string()))
}

pub struct OpenWebpageTool {
    ctx: ToolContext,
}

#[async_trait]
impl Tool for OpenWebpageTool {
    fn name(&self) -> &'static str {
        "openWebpageTool"
    }

    fn description(&self) -> &'static str {
        "This tool can open any webpage in the browser and returns the session id of the browser"
    }

    fn parameters(&self) -> Value {
        schema_of::<OpenWebpageArgs>()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: OpenWebpageArgs = parse_args(args)?;
        let opened = navigator::open_webpage(&self.ctx.store, &self.ctx.config, &args.url).await?;
        Ok(Value::String(opened.session_id))
    }
}

pub struct CloseBrowserTool {
    ctx: ToolContext,
}

#[async_trait]
impl Tool for CloseBrowserTool {
    fn name(&self) -> &'static str {
        "closeBrowserTool"
    }

    fn description(&self) -> &'static str {
        "This tool can close the browser of the given session"
    }

    fn parameters(&self) -> Value {
        schema_of::<SessionArgs>()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: SessionArgs = parse_args(args)?;
        navigator::close_browser(&self.ctx.store, &args.session_id).await?;
        Ok(Value::Null)
    }
}

pub struct GetCurrentTimeTool;

#[async_trait]
impl Tool for GetCurrentTimeTool {
    fn name(&self) -> &'static str {
        "getCurrentTimeTool"
    }

    fn description(&self) -> &'static str {
        "This tool returns the current time in milliseconds since the Unix epoch"
    }

    fn parameters(&self) -> Value {
        schema_of::<NoArgs>()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let _: NoArgs = parse_args(args)?;
        Ok(json!(current_time_millis()))
    }
}

pub struct ScrollToFormTool {
    ctx: ToolContext,
}

#[async_trait]
impl Tool for ScrollToFormTool {
    fn name(&self) -> &'static str {
        "scrollToFormTool"
    }

    fn description(&self) -> &'static str {
        "This tool can scroll to the form on the page and click on it"
    }

    fn parameters(&self) -> Value {
        schema_of::<SessionArgs>()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: SessionArgs = parse_args(args)?;
        let position = form::scroll_to_form(&self.ctx.store, &args.session_id).await?;
        Ok(json!({ "formPosition": position }))
    }
}

pub struct FindFormAndInputsTool {
    ctx: ToolContext,
}

#[async_trait]
impl Tool for FindFormAndInputsTool {
    fn name(&self) -> &'static str {
        "findFormAndInputsTool"
    }

    fn description(&self) -> &'static str {
        "This tool can find the form and inputs by session id"
    }

    fn parameters(&self) -> Value {
        schema_of::<SessionArgs>()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: SessionArgs = parse_args(args)?;
        let inputs = form::find_form_and_inputs(&self.ctx.store, &args.session_id).await?;
        Ok(json!({ "inputDetails": inputs }))
    }
}

pub struct PrepareDummyDataForFormTool;

#[async_trait]
impl Tool for PrepareDummyDataForFormTool {
    fn name(&self) -> &'static str {
        "prepareDummyDataForFormTool"
    }

    fn description(&self) -> &'static str {
        "This tool can prepare dummy data for the form and returns the inputs with values filled in"
    }

    fn parameters(&self) -> Value {
        schema_of::<InputDetailsArgs>()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: InputDetailsArgs = parse_args(args)?;
        Ok(json!({ "inputDetails": prepare_dummy_data(args.input_details) }))
    }
}

pub struct FillFormTool {
    ctx: ToolContext,
}

#[async_trait]
impl Tool for FillFormTool {
    fn name(&self) -> &'static str {
        "fillFormTool"
    }

    fn description(&self) -> &'static str {
        "This tool can fill the form by session id"
    }

    fn parameters(&self) -> Value {
        schema_of::<FillFormArgs>()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: FillFormArgs = parse_args(args)?;
        let outcome =
            form::fill_form(&self.ctx.store, &args.session_id, &args.input_details).await?;
        Ok(serde_json::to_value(outcome)?)
    }
}

pub struct GenerateScreenshotTool {
    ctx: ToolContext,
}

#[async_trait]
impl Tool for GenerateScreenshotTool {
    fn name(&self) -> &'static str {
        "generateScreenshotTool"
    }

    fn description(&self) -> &'static str {
        "This tool can take the screenshot of the given browser session and return the image path"
    }

    fn parameters(&self) -> Value {
        schema_of::<SessionArgs>()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: SessionArgs = parse_args(args)?;
        let path: PathBuf =
            screenshot::generate_screenshot(&self.ctx.store, &self.ctx.config, &args.session_id)
                .await?;
        Ok(Value::String(path.display().to_string()))
    }
}

/// Every adapter, registered against one session store.
pub struct Toolbox {
    ctx: ToolContext,
    tools: Vec<Box<dyn Tool>>,
}

impl Toolbox {
    pub fn new(store: Arc<SessionStore>, config: BrowserConfig) -> Self {
        let ctx = ToolContext {
            store,
            config: Arc::new(config),
        };
        let tools: Vec<Box<dyn Tool>> = vec![
            Box::new(CloseBrowserTool { ctx: ctx.clone() }),
            Box::new(FillFormTool { ctx: ctx.clone() }),
            Box::new(FindFormAndInputsTool { ctx: ctx.clone() }),
            Box::new(GenerateScreenshotTool { ctx: ctx.clone() }),
            Box::new(GetCurrentTimeTool),
            Box::new(OpenWebpageTool { ctx: ctx.clone() }),
            Box::new(PrepareDummyDataForFormTool),
            Box::new(ScrollToFormTool { ctx: ctx.clone() }),
        ];
        Self { ctx, tools }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.ctx.store
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name(),
                description: tool.description(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(|tool| tool.as_ref())
    }

    /// Run the named tool. Errors come back untouched; nothing is retried.
    pub async fn call(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        info!(tool = name, "tool invoked");
        debug!(tool = name, %args, "tool arguments");
        tool.execute(args).await
    }
}
