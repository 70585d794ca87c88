//! Event-data variables offered for insertion into text fields.

use serde::Serialize;
use serde_json::Value as Json;

/// One variable of the journey's entry schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaField {
    /// Full path, e.g. `Event.APIEvent-1.FirstName`.
    pub key: String,
    /// Last path segment.
    pub label: String,
    /// `{{key}}`, the text inserted into a field.
    pub token: String,
}

impl SchemaField {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let label = key.rsplit('.').next().unwrap_or_default().to_string();
        let token = format!("{{{{{key}}}}}");
        Self { key, label, token }
    }
}

#[derive(Debug, Default, Clone)]
pub struct TokenRegistry {
    fields: Vec<SchemaField>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn find(&self, token: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|field| field.token == token)
    }

    /// `(token, label, key)` triples for variable pickers.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.fields
            .iter()
            .map(|field| (field.token.as_str(), field.label.as_str(), field.key.as_str()))
    }

    /// Rebuilds the registry from a `requestedSchema` payload. Anything other
    /// than `{schema: [...]}` or a bare array leaves it untouched.
    pub fn replace_from_schema(&mut self, data: &Json) -> bool {
        let schema = match data.get("schema") {
            Some(schema) if !schema.is_null() => schema,
            _ => data,
        };
        let Some(items) = schema.as_array() else {
            tracing::warn!("schema payload holds no array; variables unchanged");
            return false;
        };

        self.fields = items.iter().filter_map(schema_key).map(SchemaField::new).collect();
        tracing::debug!(count = self.fields.len(), "schema variables loaded");
        true
    }
}

/// `key`, else `name`, else the item itself; only non-empty strings count.
fn schema_key(item: &Json) -> Option<&str> {
    fn present(value: Option<&Json>) -> Option<&Json> {
        value.filter(|value| !is_blank(value))
    }

    let candidate = present(item.get("key"))
        .or_else(|| present(item.get("name")))
        .unwrap_or(item);
    candidate.as_str().filter(|key| !key.is_empty())
}

fn is_blank(value: &Json) -> bool {
    match value {
        Json::Null => true,
        Json::Bool(b) => !b,
        Json::String(s) => s.is_empty(),
        Json::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_entries_become_tokens() {
        let mut registry = TokenRegistry::new();
        assert!(registry.replace_from_schema(&json!({
            "schema": [
                {"key": "Event.APIEvent-1.FirstName", "type": "Text"},
                {"name": "Contact.Email"},
                "Event.APIEvent-1.City",
                {"key": ""},
                {"key": 7},
                42
            ]
        })));

        let keys: Vec<&str> = registry.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["Event.APIEvent-1.FirstName", "Contact.Email", "Event.APIEvent-1.City"]
        );
        let first = &registry.fields()[0];
        assert_eq!(first.label, "FirstName");
        assert_eq!(first.token, "{{Event.APIEvent-1.FirstName}}");
        assert!(registry.find("{{Contact.Email}}").is_some());
    }

    #[test]
    fn bare_arrays_are_accepted() {
        let mut registry = TokenRegistry::new();
        assert!(registry.replace_from_schema(&json!(["A.B"])));
        assert_eq!(registry.options().next(), Some(("{{A.B}}", "B", "A.B")));
    }

    #[test]
    fn other_shapes_keep_previous_variables() {
        let mut registry = TokenRegistry::new();
        registry.replace_from_schema(&json!(["A.B"]));

        assert!(!registry.replace_from_schema(&json!({"schema": "nope"})));
        assert!(!registry.replace_from_schema(&Json::Null));
        assert_eq!(registry.fields().len(), 1);
    }
}
