use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub label: String,
    pub key: String,
}

impl Step {
    pub fn new(label: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            key: key.into(),
        }
    }

    /// Single step used when a definition declares none.
    pub fn default_steps() -> Vec<Step> {
        vec![Step::new("Configure", "configure")]
    }
}
