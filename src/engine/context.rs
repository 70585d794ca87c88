use crate::config::{FormDefinition, Settings};
use crate::core::FieldId;
use crate::core::field::FieldConfig;
use crate::core::step::Step;
use crate::script::{ExpressionEvaluator, RhaiEvaluator};
use indexmap::IndexMap;
use fancy_regex::Regex;
use std::collections::HashMap;

/// Everything the engine components read but never change, built once at
/// startup and passed by reference into each component.
pub struct EngineContext {
    fields: IndexMap<FieldId, FieldConfig>,
    steps: Vec<Step>,
    patterns: HashMap<FieldId, Regex>,
    evaluator: Box<dyn ExpressionEvaluator>,
    settings: Settings,
}

impl EngineContext {
    pub fn new(definition: FormDefinition) -> Self {
        let evaluator = RhaiEvaluator::new(definition.settings.script);
        Self::with_evaluator(definition, Box::new(evaluator))
    }

    pub fn with_evaluator(
        definition: FormDefinition,
        evaluator: Box<dyn ExpressionEvaluator>,
    ) -> Self {
        let FormDefinition {
            mut steps,
            fields,
            settings,
        } = definition;
        if steps.is_empty() {
            steps = Step::default_steps();
        }

        let patterns = fields
            .iter()
            .filter_map(|field| {
                let pattern = field.validation.as_ref()?.pattern.as_deref()?;
                match Regex::new(pattern) {
                    Ok(regex) => Some((field.id.clone(), regex)),
                    Err(err) => {
                        tracing::warn!(
                            field = %field.id,
                            pattern,
                            error = %err,
                            "invalid validation pattern; rule disabled"
                        );
                        None
                    }
                }
            })
            .collect();

        let fields = fields
            .into_iter()
            .map(|field| (field.id.clone(), field))
            .collect();

        Self {
            fields,
            steps,
            patterns,
            evaluator,
            settings,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldConfig> {
        self.fields.values()
    }

    pub fn field(&self, id: &str) -> Option<&FieldConfig> {
        self.fields.get(id)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Key of the step whose field group holds `field`.
    pub fn step_of<'a>(&'a self, field: &'a FieldConfig) -> &'a str {
        field
            .step
            .as_deref()
            .or_else(|| self.steps.first().map(|step| step.key.as_str()))
            .unwrap_or_default()
    }

    pub fn fields_in_step<'a>(&'a self, step_key: &'a str) -> impl Iterator<Item = &'a FieldConfig> {
        self.fields
            .values()
            .filter(move |field| self.step_of(field) == step_key)
    }

    pub fn pattern(&self, id: &str) -> Option<&Regex> {
        self.patterns.get(id)
    }

    pub fn evaluator(&self) -> &dyn ExpressionEvaluator {
        self.evaluator.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
