use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

pub const INIT_ACTIVITY: &str = "initActivity";
pub const INIT_ACTIVITY_RUNNING_MODE: &str = "initActivityRunningMode";
pub const INIT_ACTIVITY_RUNNING_HOVER: &str = "initActivityRunningHover";
pub const REQUESTED_TOKENS: &str = "requestedTokens";
pub const REQUESTED_ENDPOINTS: &str = "requestedEndpoints";
pub const REQUESTED_INTERACTION: &str = "requestedInteraction";
pub const REQUESTED_TRIGGER_EVENT_DEFINITION: &str = "requestedTriggerEventDefinition";
pub const REQUESTED_SCHEMA: &str = "requestedSchema";
pub const CLICKED_NEXT: &str = "clickedNext";
pub const CLICKED_BACK: &str = "clickedBack";
pub const GOTO_STEP: &str = "gotoStep";

/// A named message pushed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMessage {
    #[serde(rename = "event")]
    pub name: String,
    #[serde(default)]
    pub data: Json,
}

impl HostMessage {
    pub fn new(name: impl Into<String>, data: Json) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavButton {
    Next,
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonUpdate {
    pub button: NavButton,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub visible: bool,
}

/// Requests the engine sends to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum HostRequest {
    Ready,
    RequestTokens,
    RequestEndpoints,
    RequestInteraction,
    RequestTriggerEventDefinition,
    RequestSchema,
    NextStep,
    PrevStep,
    UpdateButton(ButtonUpdate),
    UpdateActivity(Json),
    RequestInspectorClose,
}

impl HostRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::RequestTokens => "requestTokens",
            Self::RequestEndpoints => "requestEndpoints",
            Self::RequestInteraction => "requestInteraction",
            Self::RequestTriggerEventDefinition => "requestTriggerEventDefinition",
            Self::RequestSchema => "requestSchema",
            Self::NextStep => "nextStep",
            Self::PrevStep => "prevStep",
            Self::UpdateButton(_) => "updateButton",
            Self::UpdateActivity(_) => "updateActivity",
            Self::RequestInspectorClose => "requestInspectorClose",
        }
    }
}
