use serde_json::Value as Json;

/// Current value of a form field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Nothing selected (radio group with no checked option).
    #[default]
    None,
    Text(String),
    Bool(bool),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(v) => v.is_empty(),
            Self::Bool(_) => false,
        }
    }

    /// Falsy values are an empty text, an unchecked box and no selection.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Text(v) => !v.is_empty(),
            Self::Bool(v) => *v,
        }
    }

    /// Stringified form used by length and pattern rules.
    pub fn to_text(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Text(v) => v.clone(),
            Self::Bool(v) => v.to_string(),
        }
    }

    /// Text substituted into web-service templates: falsy values become empty.
    pub fn template_text(&self) -> String {
        if self.is_truthy() {
            self.to_text()
        } else {
            String::new()
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            Self::None => Json::Null,
            Self::Text(v) => Json::String(v.clone()),
            Self::Bool(v) => Json::Bool(*v),
        }
    }
}

/// Text a JSON value takes when written into a text control.
pub fn json_to_text(value: &Json) -> String {
    match value {
        Json::Null => String::new(),
        Json::String(s) => s.clone(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => n.to_string(),
        Json::Array(_) | Json::Object(_) => value.to_string(),
    }
}

/// JavaScript truthiness over JSON: only null, false, 0, NaN and "" are falsy.
pub fn json_truthy(value: &Json) -> bool {
    match value {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Json::String(s) => !s.is_empty(),
        Json::Array(_) | Json::Object(_) => true,
    }
}
