use crate::core::FieldId;
use crate::core::field::{CHANGE_EVENT, FieldConfig, INPUT_EVENT, ServiceTrigger};
use crate::core::form_state::FormState;
use crate::core::text_edit::{Selection, insert_at_selection};
use crate::core::value::Value;
use crate::engine::context::EngineContext;
use crate::engine::validation::{ValidationEngine, ValidationFailure, field_json};
use crate::engine::visibility::VisibilityEngine;
use crate::script::{Evaluation, ExpressionKind, evaluate_or_log};
use crate::service::dispatcher::WebServiceDispatcher;
use crate::service::request::ServiceCompletion;
use crate::service::transport::HttpTransport;
use serde_json::{Value as Json, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundAction {
    Handler(usize),
    Service(usize),
}

/// Runtime for one form instance: owns the values and wires every configured
/// behavior (handlers, web services, visibility, validation) to field events.
pub struct FieldBehaviorEngine {
    context: EngineContext,
    form: FormState,
    visibility: VisibilityEngine,
    validation: ValidationEngine,
    dispatcher: WebServiceDispatcher,
    bindings: HashMap<FieldId, HashMap<String, Vec<BoundAction>>>,
    started: bool,
}

impl FieldBehaviorEngine {
    pub fn new(context: EngineContext, transport: Arc<dyn HttpTransport>) -> Self {
        let form = FormState::from_fields(context.fields());
        let bindings = build_bindings(&context);
        Self {
            context,
            form,
            visibility: VisibilityEngine::new(),
            validation: ValidationEngine::new(),
            dispatcher: WebServiceDispatcher::new(transport),
            bindings,
            started: false,
        }
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn visibility(&self) -> &VisibilityEngine {
        &self.visibility
    }

    pub fn value(&self, id: &str) -> Option<&Value> {
        self.form.get(id)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visibility.is_visible(id)
    }

    pub fn is_loading(&self, id: &str) -> bool {
        self.dispatcher.is_loading(id)
    }

    pub fn error(&self, id: &str) -> Option<&ValidationFailure> {
        self.validation.error(id)
    }

    pub fn pending_services(&self) -> usize {
        self.dispatcher.pending()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Visible fields of one step, in configuration order.
    pub fn visible_fields<'a>(&'a self, step_key: &'a str) -> impl Iterator<Item = &'a FieldConfig> {
        self.context
            .fields_in_step(step_key)
            .filter(move |field| self.visibility.is_visible(field.id.as_str()))
    }

    /// Fires `load` services, runs every `customInit` and computes the first
    /// visibility pass. Later calls do nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        for field in self.context.fields() {
            for (index, service) in field.web_services.iter().enumerate() {
                if service.trigger == ServiceTrigger::Load {
                    self.dispatcher.dispatch(&field.id, index, service, &self.form);
                }
            }
        }

        let ids: Vec<FieldId> = self
            .context
            .fields()
            .filter(|field| field.custom_init.is_some())
            .map(|field| field.id.clone())
            .collect();
        for id in ids {
            self.run_custom_init(&id);
        }

        self.visibility.reevaluate_all(&self.context, &self.form);
        tracing::debug!(fields = self.form.len(), "form engine started");
    }

    /// Delivers a field event: bound handlers first, then bound services.
    pub fn fire_event(&mut self, id: &str, event: &str) {
        let Some(actions) = self
            .bindings
            .get(id)
            .and_then(|events| events.get(event))
            .cloned()
        else {
            if is_value_event(event) && self.context.field(id).is_some() {
                self.visibility.reevaluate_all(&self.context, &self.form);
            }
            return;
        };
        let field_id = FieldId::new(id);

        let mut changed = false;
        for action in actions {
            match action {
                BoundAction::Handler(index) => {
                    changed |= self.run_handler(&field_id, event, index);
                }
                BoundAction::Service(index) => {
                    let Some(field) = self.context.field(id) else {
                        continue;
                    };
                    if let Some(service) = field.web_services.get(index) {
                        self.dispatcher.dispatch(&field.id, index, service, &self.form);
                    }
                }
            }
        }

        if changed || is_value_event(event) {
            self.visibility.reevaluate_all(&self.context, &self.form);
        }
    }

    /// Programmatic write: no events fire, visibility follows.
    pub fn set_value(&mut self, id: &str, value: Value) -> bool {
        if self.context.field(id).is_none() {
            tracing::debug!(field = id, "ignoring value for unknown field");
            return false;
        }
        let changed = self.form.set(id, value);
        if changed {
            self.visibility.reevaluate_all(&self.context, &self.form);
        }
        changed
    }

    /// Programmatic write of a JSON value, coerced the way the field's control would.
    pub fn set_json(&mut self, id: &str, value: &Json) -> bool {
        let Some(field) = self.context.field(id) else {
            tracing::debug!(field = id, "ignoring value for unknown field");
            return false;
        };
        let changed = self.form.assign_json(field, value);
        if changed {
            self.visibility.reevaluate_all(&self.context, &self.form);
        }
        changed
    }

    /// A user edit: the value is written and a `change` event fires.
    pub fn change_value(&mut self, id: &str, value: Value) {
        if self.context.field(id).is_none() {
            tracing::debug!(field = id, "ignoring edit of unknown field");
            return;
        }
        self.form.set(id, value);
        self.fire_event(id, CHANGE_EVENT);
    }

    /// A user edit given as JSON. Values the control would reject (a radio
    /// option that does not exist) change nothing, but `change` still fires.
    pub fn change_json(&mut self, id: &str, value: &Json) {
        let Some(field) = self.context.field(id) else {
            tracing::debug!(field = id, "ignoring edit of unknown field");
            return;
        };
        self.form.assign_json(field, value);
        self.fire_event(id, CHANGE_EVENT);
    }

    /// Seeds values from saved `(key, value)` arguments. Keys without a
    /// configured field are skipped.
    pub fn seed_from_arguments(&mut self, arguments: &[(String, Json)]) {
        for (key, value) in arguments {
            match self.context.field(key.as_str()) {
                Some(field) => {
                    self.form.assign_json(field, value);
                }
                None => tracing::debug!(key = key.as_str(), "saved argument has no field"),
            }
        }
        self.visibility.reevaluate_all(&self.context, &self.form);
    }

    /// Replaces `selection` of a text field with `token` and fires `change`.
    /// Returns the new cursor position, or `None` when nothing was inserted.
    pub fn insert_token(&mut self, id: &str, token: &str, selection: Selection) -> Option<usize> {
        if token.is_empty() {
            tracing::debug!(field = id, "empty token rejected");
            return None;
        }
        let field = self.context.field(id)?;
        if !field.kind.accepts_text() {
            tracing::debug!(field = id, kind = field.kind.as_str(), "field does not take tokens");
            return None;
        }

        let mut text = self
            .form
            .get(id)
            .map(Value::to_text)
            .unwrap_or_default();
        let cursor = insert_at_selection(&mut text, selection, token);
        self.form.set(id, Value::Text(text));
        self.fire_event(id, CHANGE_EVENT);
        Some(cursor)
    }

    pub fn validate_step(&mut self, step_key: &str) -> bool {
        self.validation
            .validate_step(step_key, &self.context, &self.form, &self.visibility)
    }

    /// Applies every completion that has already arrived. Returns how many.
    pub fn poll_services(&mut self) -> usize {
        let completions = self.dispatcher.drain_ready();
        let count = completions.len();
        for completion in completions {
            self.apply_completion(completion);
        }
        count
    }

    /// Applies completions until nothing is in flight or `timeout` passes.
    /// Returns true when every call settled.
    pub fn wait_for_services(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.dispatcher.pending() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.dispatcher.wait_next(remaining) {
                Some(completion) => self.apply_completion(completion),
                None => break,
            }
        }
        self.dispatcher.pending() == 0
    }

    fn apply_completion(&mut self, completion: ServiceCompletion) {
        let Ok(response) = completion.result else {
            return;
        };
        let Some(field) = self.context.field(completion.field_id.as_str()) else {
            return;
        };
        let Some(mapping) = field
            .web_services
            .get(completion.service_index)
            .and_then(|service| service.response_mapping.as_deref())
        else {
            return;
        };

        let field_arg = self.script_field(field);
        let evaluation = evaluate_or_log(
            self.context.evaluator(),
            ExpressionKind::ResponseMapping,
            &field.id,
            &["response", "field"],
            mapping,
            vec![response, field_arg.clone()],
        );

        if self.apply_field_mutation(&completion.field_id, &field_arg, evaluation) {
            self.visibility.reevaluate_all(&self.context, &self.form);
        }
    }

    fn run_custom_init(&mut self, id: &FieldId) {
        let Some(field) = self.context.field(id.as_str()) else {
            return;
        };
        let Some(script) = field.custom_init.as_deref() else {
            return;
        };

        let field_arg = self.script_field(field);
        let evaluation = evaluate_or_log(
            self.context.evaluator(),
            ExpressionKind::CustomInit,
            &field.id,
            &["field"],
            script,
            vec![field_arg.clone()],
        );
        self.apply_field_mutation(id, &field_arg, evaluation);
    }

    fn run_handler(&mut self, id: &FieldId, event: &str, index: usize) -> bool {
        let Some(field) = self.context.field(id.as_str()) else {
            return false;
        };
        let Some(handler) = field.event_handlers.get(index) else {
            return false;
        };

        let value = self.form.get(id.as_str()).cloned().unwrap_or_default();
        let field_arg = self.script_field(field);
        let evaluation = evaluate_or_log(
            self.context.evaluator(),
            ExpressionKind::EventHandler,
            &field.id,
            &["event", "field", "value"],
            handler.handler.as_str(),
            vec![
                json!({ "type": event, "target": id.as_str() }),
                field_arg.clone(),
                value.to_json(),
            ],
        );
        self.apply_field_mutation(id, &field_arg, evaluation)
    }

    /// Writes back `field.value` when a script changed it.
    fn apply_field_mutation(
        &mut self,
        id: &FieldId,
        before: &Json,
        evaluation: Option<Evaluation>,
    ) -> bool {
        let Some(after) = evaluation
            .as_ref()
            .and_then(|evaluation| evaluation.binding("field"))
            .and_then(|field| field.get("value"))
        else {
            return false;
        };
        if before.get("value") == Some(after) {
            return false;
        }
        let Some(field) = self.context.field(id.as_str()) else {
            return false;
        };
        self.form.assign_json(field, after)
    }

    fn script_field(&self, field: &FieldConfig) -> Json {
        let value = self.form.get(field.id.as_str()).cloned().unwrap_or_default();
        let mut object = field_json(field, &value, &self.context, &self.visibility);
        object["loading"] = Json::Bool(self.dispatcher.is_loading(field.id.as_str()));
        object
    }
}

fn is_value_event(event: &str) -> bool {
    event == CHANGE_EVENT || event == INPUT_EVENT
}

/// Per field and event name: handlers first, then services, each in
/// configuration order.
fn build_bindings(context: &EngineContext) -> HashMap<FieldId, HashMap<String, Vec<BoundAction>>> {
    let mut bindings: HashMap<FieldId, HashMap<String, Vec<BoundAction>>> = HashMap::new();

    for field in context.fields() {
        let events = bindings.entry(field.id.clone()).or_default();
        for (index, handler) in field.event_handlers.iter().enumerate() {
            events
                .entry(handler.event.clone())
                .or_default()
                .push(BoundAction::Handler(index));
        }
        for (index, service) in field.web_services.iter().enumerate() {
            if let Some(event) = service.trigger.event_name() {
                events
                    .entry(event.to_string())
                    .or_default()
                    .push(BoundAction::Service(index));
            }
        }
    }

    bindings.retain(|_, events| !events.is_empty());
    bindings
}
