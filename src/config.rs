use crate::core::field::FieldConfig;
use crate::core::step::Step;
use crate::error::{FormError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Static document describing the whole form: wizard steps, field behavior
/// and engine settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub settings: Settings,
}

impl FormDefinition {
    pub fn new(steps: Vec<Step>, fields: Vec<FieldConfig>) -> Self {
        Self {
            steps,
            fields,
            settings: Settings::default(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let definition: Self = serde_json::from_str(raw)?;
        definition.normalized()
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let definition: Self = serde_yaml::from_str(raw)?;
        definition.normalized()
    }

    /// Loads a definition file; the extension selects the format.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| FormError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(raw.as_str()),
            Some("yaml") | Some("yml") => Self::from_yaml_str(raw.as_str()),
            _ => Err(FormError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Fills in the default step and checks id/key uniqueness.
    pub fn normalized(mut self) -> Result<Self> {
        if self.steps.is_empty() {
            self.steps = Step::default_steps();
        }

        let mut step_keys = HashSet::new();
        for step in &self.steps {
            if !step_keys.insert(step.key.as_str()) {
                return Err(FormError::DuplicateStepKey(step.key.clone()));
            }
        }

        let mut field_ids = HashSet::new();
        for field in &self.fields {
            if !field_ids.insert(field.id.as_str()) {
                return Err(FormError::DuplicateFieldId(field.id.to_string()));
            }
            if let Some(step) = field.step.as_deref() {
                if !step_keys.contains(step) {
                    return Err(FormError::UnknownStep {
                        field: field.id.to_string(),
                        step: step.to_string(),
                    });
                }
            }
        }

        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub next_label: String,
    pub done_label: String,
    pub request_timeout_ms: u64,
    pub script: ScriptLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            next_label: "Next".to_string(),
            done_label: "Done".to_string(),
            request_timeout_ms: 30_000,
            script: ScriptLimits::default(),
        }
    }
}

/// Resource ceilings for a single expression run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScriptLimits {
    pub max_operations: u64,
    pub max_call_levels: usize,
    pub max_expr_depth: usize,
    pub max_string_size: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            max_operations: 100_000,
            max_call_levels: 32,
            max_expr_depth: 64,
            max_string_size: 1 << 20,
        }
    }
}
