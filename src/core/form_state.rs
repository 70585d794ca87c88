use crate::core::FieldId;
use crate::core::field::{FieldConfig, FieldKind};
use crate::core::value::{Value, json_to_text};
use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

/// Live field values, kept in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    values: IndexMap<FieldId, Value>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a FieldConfig>) -> Self {
        let values = fields
            .into_iter()
            .map(|field| (field.id.clone(), initial_value(field)))
            .collect();
        Self { values }
    }

    /// Returns true when the stored value changed.
    pub fn set(&mut self, id: impl Into<FieldId>, value: Value) -> bool {
        let id = id.into();
        match self.values.get_mut(id.as_str()) {
            Some(current) if *current == value => false,
            Some(current) => {
                *current = value;
                true
            }
            None => {
                self.values.insert(id, value);
                true
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `{fieldId -> value}` over every field, as handed to visibility predicates.
    pub fn snapshot(&self) -> Map<String, Json> {
        self.values
            .iter()
            .map(|(id, value)| (id.to_string(), value.to_json()))
            .collect()
    }

    /// Writes a JSON value into `field` with the coercion its control applies.
    /// Returns true when the stored value changed.
    pub fn assign_json(&mut self, field: &FieldConfig, value: &Json) -> bool {
        match coerce_json(field, value) {
            Some(value) => self.set(field.id.clone(), value),
            None => false,
        }
    }
}

/// Coerces an incoming JSON value for `field`. `None` means the control would
/// ignore it (a radio value outside the configured options).
pub fn coerce_json(field: &FieldConfig, value: &Json) -> Option<Value> {
    match field.kind {
        FieldKind::Checkbox => {
            let checked = match value {
                Json::Bool(b) => *b,
                Json::String(s) => s == "true",
                _ => false,
            };
            Some(Value::Bool(checked))
        }
        FieldKind::Radio => {
            if value.is_null() {
                return Some(Value::None);
            }
            let text = json_to_text(value);
            if field.options.is_empty() || field.options.iter().any(|o| *o == text) {
                Some(Value::Text(text))
            } else {
                None
            }
        }
        _ => Some(Value::Text(json_to_text(value))),
    }
}

fn initial_value(field: &FieldConfig) -> Value {
    let from_default = field
        .default_value
        .as_ref()
        .and_then(|value| coerce_json(field, value));
    if let Some(value) = from_default {
        return value;
    }
    match field.kind {
        FieldKind::Checkbox => Value::Bool(false),
        FieldKind::Radio => Value::None,
        _ => Value::Text(String::new()),
    }
}
