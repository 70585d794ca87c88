//! Show/hide state driven by `conditionalVisibility` predicates.
//!
//! Predicates see raw field values only, never another field's visibility,
//! so the outcome does not depend on evaluation order. Keep it that way: a
//! predicate that read visibility would make configuration order observable.

use crate::core::FieldId;
use crate::core::form_state::FormState;
use crate::core::value::json_truthy;
use crate::engine::context::EngineContext;
use crate::script::{ExpressionKind, evaluate_or_log};
use serde_json::Value as Json;
use std::collections::HashSet;

#[derive(Debug, Default, Clone)]
pub struct VisibilityEngine {
    hidden: HashSet<FieldId>,
}

impl VisibilityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden.contains(id)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        !self.is_hidden(id)
    }

    /// Recomputes every predicate against one snapshot of the form.
    /// A failing predicate logs and leaves its field visible.
    pub fn reevaluate_all(&mut self, context: &EngineContext, form: &FormState) {
        let snapshot = Json::Object(form.snapshot());

        for field in context.fields() {
            let Some(expression) = field.conditional_visibility.as_deref() else {
                continue;
            };

            let show = evaluate_or_log(
                context.evaluator(),
                ExpressionKind::Visibility,
                &field.id,
                &["values"],
                expression,
                vec![snapshot.clone()],
            )
            .map(|evaluation| json_truthy(&evaluation.value))
            .unwrap_or(true);

            if show {
                self.hidden.remove(field.id.as_str());
            } else {
                self.hidden.insert(field.id.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormDefinition;
    use crate::core::field::{FieldConfig, FieldKind};
    use crate::core::step::Step;
    use crate::core::value::Value;

    fn context() -> EngineContext {
        EngineContext::new(FormDefinition::new(
            Step::default_steps(),
            vec![
                FieldConfig::new("country", FieldKind::Select),
                FieldConfig::new("opt_in", FieldKind::Checkbox),
                FieldConfig::new("tax_id", FieldKind::Text)
                    .with_visibility(r#"values.country == "BR""#),
                FieldConfig::new("email", FieldKind::Email).with_visibility("values.opt_in"),
                FieldConfig::new("broken", FieldKind::Text)
                    .with_visibility(r#"values.country ==="#),
                FieldConfig::new("broken_call", FieldKind::Text)
                    .with_visibility("no_such_function(values)"),
                FieldConfig::new("notes", FieldKind::Textarea),
            ],
        ))
    }

    #[test]
    fn predicates_follow_current_values() {
        let context = context();
        let mut form = FormState::from_fields(context.fields());
        let mut visibility = VisibilityEngine::new();

        visibility.reevaluate_all(&context, &form);
        assert!(visibility.is_hidden("tax_id"));
        assert!(visibility.is_hidden("email"));

        form.set("country", Value::text("BR"));
        form.set("opt_in", Value::Bool(true));
        visibility.reevaluate_all(&context, &form);
        assert!(visibility.is_visible("tax_id"));
        assert!(visibility.is_visible("email"));

        form.set("country", Value::text("US"));
        visibility.reevaluate_all(&context, &form);
        assert!(visibility.is_hidden("tax_id"));
    }

    #[test]
    fn fields_without_predicate_are_always_visible() {
        let context = context();
        let mut form = FormState::from_fields(context.fields());
        let mut visibility = VisibilityEngine::new();

        for country in ["", "BR", "US"] {
            form.set("country", Value::text(country));
            visibility.reevaluate_all(&context, &form);
            assert!(visibility.is_visible("notes"));
            assert!(visibility.is_visible("country"));
        }
    }

    #[test]
    fn malformed_predicates_default_to_visible() {
        let context = context();
        let form = FormState::from_fields(context.fields());
        let mut visibility = VisibilityEngine::new();

        visibility.reevaluate_all(&context, &form);
        assert!(visibility.is_visible("broken"));
        assert!(visibility.is_visible("broken_call"));
    }
}
