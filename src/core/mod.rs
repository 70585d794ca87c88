pub mod field;
pub mod form_state;
pub mod step;
pub mod template;
pub mod text_edit;
pub mod value;

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

/// Stable field identifier. Doubles as the field's key in the form state and
/// in the persisted argument list, so a blank id is rejected at load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field id must not be blank")]
pub struct BlankFieldId;

impl FieldId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for FieldId {
    type Error = BlankFieldId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(BlankFieldId);
        }
        Ok(Self(value))
    }
}

impl From<FieldId> for String {
    fn from(id: FieldId) -> Self {
        id.0
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Borrow<str> for FieldId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_ids_do_not_deserialize() {
        assert!(serde_json::from_value::<FieldId>(json!("  ")).is_err());
        assert!(serde_json::from_value::<FieldId>(json!("")).is_err());
        let id: FieldId = serde_json::from_value(json!("zip")).expect("id");
        assert_eq!(id.as_str(), "zip");
        assert_eq!(serde_json::to_value(&id).expect("json"), json!("zip"));
    }
}
