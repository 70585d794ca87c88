use crate::core::FieldId;
use crate::core::field::FieldConfig;
use crate::core::form_state::FormState;
use crate::core::value::Value;
use crate::engine::context::EngineContext;
use crate::engine::visibility::VisibilityEngine;
use crate::script::{ExpressionKind, evaluate_or_log};
use indexmap::IndexMap;
use serde_json::{Value as Json, json};
use thiserror::Error;

/// Why a field was flagged. Rendered next to the field by the host UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("This field is required")]
    Required,
    #[error("Minimum length is {0}")]
    TooShort(usize),
    #[error("Maximum length is {0}")]
    TooLong(usize),
    #[error("Value must match pattern: {0}")]
    PatternMismatch(String),
    #[error("Invalid value")]
    Custom,
}

/// Reversible per-field error markers for the last validation pass.
#[derive(Debug, Default, Clone)]
pub struct ValidationEngine {
    errors: IndexMap<FieldId, ValidationFailure>,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self, id: &str) -> Option<&ValidationFailure> {
        self.errors.get(id)
    }

    pub fn has_error(&self, id: &str) -> bool {
        self.errors.contains_key(id)
    }

    pub fn errors(&self) -> impl Iterator<Item = (&FieldId, &ValidationFailure)> {
        self.errors.iter()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Validates the fields of one step, flagging each failure. Hidden fields
    /// are skipped entirely.
    pub fn validate_step(
        &mut self,
        step_key: &str,
        context: &EngineContext,
        form: &FormState,
        visibility: &VisibilityEngine,
    ) -> bool {
        self.errors.clear();

        for field in context.fields_in_step(step_key) {
            if visibility.is_hidden(field.id.as_str()) {
                continue;
            }

            let value = form.get(field.id.as_str()).cloned().unwrap_or_default();
            if let Err(failure) = validate_field(field, &value, context, visibility) {
                tracing::debug!(field = %field.id, reason = %failure, "field failed validation");
                self.errors.insert(field.id.clone(), failure);
            }
        }

        self.errors.is_empty()
    }
}

/// Applies the rules of one field, stopping at the first failure.
pub fn validate_field(
    field: &FieldConfig,
    value: &Value,
    context: &EngineContext,
    visibility: &VisibilityEngine,
) -> Result<(), ValidationFailure> {
    if !value.is_truthy() {
        return if field.required {
            Err(ValidationFailure::Required)
        } else {
            Ok(())
        };
    }

    let Some(rules) = field.validation.as_ref() else {
        return Ok(());
    };

    let text = value.to_text();
    let length = text.chars().count();

    if let Some(min) = rules.min_length.filter(|min| *min > 0) {
        if length < min {
            return Err(ValidationFailure::TooShort(min));
        }
    }

    if let Some(max) = rules.max_length.filter(|max| *max > 0) {
        if length > max {
            return Err(ValidationFailure::TooLong(max));
        }
    }

    if let Some(regex) = context.pattern(field.id.as_str()) {
        match regex.is_match(text.as_str()) {
            Ok(true) => {}
            Ok(false) => {
                return Err(ValidationFailure::PatternMismatch(regex.as_str().to_string()));
            }
            Err(err) => {
                tracing::warn!(field = %field.id, error = %err, "pattern check aborted; rule skipped");
            }
        }
    }

    if let Some(predicate) = rules.custom_validation.as_deref() {
        let evaluation = evaluate_or_log(
            context.evaluator(),
            ExpressionKind::Validation,
            &field.id,
            &["value", "field"],
            predicate,
            vec![value.to_json(), field_json(field, value, context, visibility)],
        );
        if evaluation.is_some_and(|evaluation| evaluation.value == Json::Bool(false)) {
            return Err(ValidationFailure::Custom);
        }
    }

    Ok(())
}

/// The `field` object handed to scripts.
pub(crate) fn field_json(
    field: &FieldConfig,
    value: &Value,
    context: &EngineContext,
    visibility: &VisibilityEngine,
) -> Json {
    json!({
        "id": field.id.as_str(),
        "type": field.kind.as_str(),
        "label": field.label,
        "required": field.required,
        "options": field.options,
        "value": value.to_json(),
        "visible": visibility.is_visible(field.id.as_str()),
        "step": context.step_of(field),
    })
}
