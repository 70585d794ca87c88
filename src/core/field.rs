use crate::core::FieldId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CHANGE_EVENT: &str = "change";
pub const INPUT_EVENT: &str = "input";
pub const LOAD_TRIGGER: &str = "load";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    #[serde(rename = "text-input", alias = "text")]
    Text,
    Textarea,
    Checkbox,
    Radio,
    Select,
    Number,
    Email,
    Date,
    Hidden,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text-input",
            Self::Textarea => "textarea",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Select => "select",
            Self::Number => "number",
            Self::Email => "email",
            Self::Date => "date",
            Self::Hidden => "hidden",
        }
    }

    pub fn accepts_text(self) -> bool {
        !matches!(self, Self::Checkbox | Self::Radio | Self::Select)
    }
}

/// Declarative description of one form field. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: Option<String>,
    /// Key of the wizard step holding this field; `None` means the first step.
    #[serde(default)]
    pub step: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub validation: Option<ValidationRules>,
    #[serde(default)]
    pub web_services: Vec<WebServiceConfig>,
    #[serde(default)]
    pub event_handlers: Vec<EventHandlerConfig>,
    #[serde(default)]
    pub conditional_visibility: Option<String>,
    #[serde(default)]
    pub custom_init: Option<String>,
}

impl FieldConfig {
    pub fn new(id: impl Into<FieldId>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: None,
            step: None,
            options: Vec::new(),
            default_value: None,
            required: false,
            validation: None,
            web_services: Vec::new(),
            event_handlers: Vec::new(),
            conditional_visibility: None,
            custom_init: None,
        }
    }

    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_validation(mut self, validation: ValidationRules) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_visibility(mut self, expression: impl Into<String>) -> Self {
        self.conditional_visibility = Some(expression.into());
        self
    }

    pub fn with_web_service(mut self, service: WebServiceConfig) -> Self {
        self.web_services.push(service);
        self
    }

    pub fn with_handler(mut self, event: impl Into<String>, handler: impl Into<String>) -> Self {
        self.event_handlers.push(EventHandlerConfig {
            event: event.into(),
            handler: handler.into(),
        });
        self
    }

    pub fn with_init(mut self, script: impl Into<String>) -> Self {
        self.custom_init = Some(script.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub custom_validation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Methods whose payload travels in the query string.
    pub fn uses_query(self) -> bool {
        matches!(self, Self::Get | Self::Head)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "HEAD" => Some(Self::Head),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceTrigger {
    /// Fire once while the engine starts.
    Load,
    /// Fire on every occurrence of the named field event.
    Event(String),
}

impl ServiceTrigger {
    pub fn event_name(&self) -> Option<&str> {
        match self {
            Self::Load => None,
            Self::Event(name) => Some(name.as_str()),
        }
    }
}

impl From<String> for ServiceTrigger {
    fn from(value: String) -> Self {
        if value == LOAD_TRIGGER {
            Self::Load
        } else {
            Self::Event(value)
        }
    }
}

impl From<ServiceTrigger> for String {
    fn from(value: ServiceTrigger) -> Self {
        match value {
            ServiceTrigger::Load => LOAD_TRIGGER.to_string(),
            ServiceTrigger::Event(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebServiceConfig {
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub trigger: ServiceTrigger,
    #[serde(default)]
    pub response_mapping: Option<String>,
}

impl WebServiceConfig {
    pub fn new(url: impl Into<String>, trigger: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: None,
            body: None,
            trigger: ServiceTrigger::from(trigger.into()),
            response_mapping: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_response_mapping(mut self, mapping: impl Into<String>) -> Self {
        self.response_mapping = Some(mapping.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHandlerConfig {
    pub event: String,
    pub handler: String,
}
