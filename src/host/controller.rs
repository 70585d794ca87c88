use crate::core::field::FieldConfig;
use crate::core::text_edit::Selection;
use crate::engine::behavior::FieldBehaviorEngine;
use crate::engine::context::EngineContext;
use crate::host::channel::HostChannel;
use crate::host::message::{self, HostMessage, HostRequest};
use crate::payload::{collect_arguments, finalize, in_arguments};
use crate::service::transport::HttpTransport;
use crate::tokens::TokenRegistry;
use crate::wizard::{Advance, StepWizard};
use serde_json::{Map, Value as Json};
use std::collections::HashMap;
use std::sync::Arc;

type MessageHandler<C> = fn(&mut ActivityController<C>, Json);

/// Glue between the host connection and the form engine. Every inbound
/// message name maps to one handler in an explicit table.
pub struct ActivityController<C: HostChannel> {
    engine: FieldBehaviorEngine,
    wizard: StepWizard,
    tokens: TokenRegistry,
    payload: Json,
    channel: C,
    handlers: HashMap<&'static str, MessageHandler<C>>,
}

impl<C: HostChannel> ActivityController<C> {
    pub fn new(context: EngineContext, transport: Arc<dyn HttpTransport>, channel: C) -> Self {
        let wizard = StepWizard::new(context.steps().to_vec());
        let engine = FieldBehaviorEngine::new(context, transport);

        let mut handlers: HashMap<&'static str, MessageHandler<C>> = HashMap::new();
        handlers.insert(message::INIT_ACTIVITY, Self::on_init_activity);
        handlers.insert(message::INIT_ACTIVITY_RUNNING_MODE, Self::on_running_mode);
        handlers.insert(message::INIT_ACTIVITY_RUNNING_HOVER, Self::on_running_hover);
        handlers.insert(message::REQUESTED_TOKENS, Self::on_tokens);
        handlers.insert(message::REQUESTED_ENDPOINTS, Self::on_endpoints);
        handlers.insert(message::REQUESTED_INTERACTION, Self::on_interaction);
        handlers.insert(
            message::REQUESTED_TRIGGER_EVENT_DEFINITION,
            Self::on_trigger_event_definition,
        );
        handlers.insert(message::REQUESTED_SCHEMA, Self::on_schema);
        handlers.insert(message::CLICKED_NEXT, Self::on_clicked_next);
        handlers.insert(message::CLICKED_BACK, Self::on_clicked_back);
        handlers.insert(message::GOTO_STEP, Self::on_goto_step);

        Self {
            engine,
            wizard,
            tokens: TokenRegistry::new(),
            payload: Json::Object(Map::new()),
            channel,
            handlers,
        }
    }

    pub fn engine(&self) -> &FieldBehaviorEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut FieldBehaviorEngine {
        &mut self.engine
    }

    pub fn wizard(&self) -> &StepWizard {
        &self.wizard
    }

    pub fn tokens(&self) -> &TokenRegistry {
        &self.tokens
    }

    pub fn payload(&self) -> &Json {
        &self.payload
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Announces readiness, asks the host for its context and starts the engine.
    pub fn ready(&mut self) {
        self.channel.trigger(HostRequest::Ready);
        self.channel.trigger(HostRequest::RequestTokens);
        self.channel.trigger(HostRequest::RequestEndpoints);
        self.channel.trigger(HostRequest::RequestInteraction);
        self.channel.trigger(HostRequest::RequestTriggerEventDefinition);
        self.channel.trigger(HostRequest::RequestSchema);
        self.engine.start();
    }

    pub fn receive(&mut self, message: HostMessage) {
        match self.handlers.get(message.name.as_str()).copied() {
            Some(handler) => handler(self, message.data),
            None => tracing::debug!(event = message.name.as_str(), "ignoring unknown host message"),
        }
    }

    /// Form submission behaves like the host's Next button.
    pub fn submit(&mut self) {
        self.on_clicked_next(Json::Null);
    }

    pub fn cancel(&mut self) {
        self.channel.trigger(HostRequest::RequestInspectorClose);
    }

    /// Applies finished web-service calls.
    pub fn poll(&mut self) -> usize {
        self.engine.poll_services()
    }

    /// Visible fields of the current step.
    pub fn visible_fields(&self) -> Vec<&FieldConfig> {
        self.engine
            .visible_fields(self.wizard.current_step().key.as_str())
            .collect()
    }

    pub fn insert_variable(&mut self, field: &str, token: &str, selection: Selection) -> Option<usize> {
        if self.tokens.find(token).is_none() {
            tracing::debug!(field, token, "inserting a token the schema does not list");
        }
        self.engine.insert_token(field, token, selection)
    }

    fn send_button_updates(&mut self) {
        for update in self.wizard.button_updates(self.engine.context().settings()) {
            self.channel.trigger(HostRequest::UpdateButton(update));
        }
    }

    fn on_init_activity(&mut self, data: Json) {
        if !data.is_null() {
            self.payload = data;
        }
        let arguments = in_arguments(&self.payload);
        tracing::debug!(arguments = arguments.len(), "activity initialized");
        self.engine.seed_from_arguments(&arguments);
        self.send_button_updates();
    }

    fn on_running_mode(&mut self, data: Json) {
        tracing::info!(%data, "running mode");
    }

    fn on_running_hover(&mut self, data: Json) {
        tracing::info!(%data, "running hover");
    }

    fn on_tokens(&mut self, data: Json) {
        tracing::info!(%data, "tokens received");
    }

    fn on_endpoints(&mut self, data: Json) {
        tracing::info!(%data, "endpoints received");
    }

    fn on_interaction(&mut self, data: Json) {
        tracing::info!(%data, "interaction received");
    }

    fn on_trigger_event_definition(&mut self, data: Json) {
        tracing::info!(%data, "trigger event definition received");
    }

    fn on_schema(&mut self, data: Json) {
        if self.tokens.replace_from_schema(&data) {
            for (token, label, _) in self.tokens.options() {
                tracing::trace!(token, label, "variable available");
            }
        }
    }

    fn on_clicked_next(&mut self, _data: Json) {
        let step_key = self.wizard.current_step().key.clone();
        let valid = self.engine.validate_step(step_key.as_str());

        match self.wizard.request_advance(valid) {
            Advance::Blocked => {
                tracing::debug!(step = step_key.as_str(), "step has invalid fields");
            }
            Advance::NextStep => self.channel.trigger(HostRequest::NextStep),
            Advance::Finish => self.save(),
        }
    }

    fn on_clicked_back(&mut self, _data: Json) {
        if self.wizard.request_retreat() {
            self.channel.trigger(HostRequest::PrevStep);
        }
    }

    fn on_goto_step(&mut self, data: Json) {
        let Some(key) = data.get("key").and_then(Json::as_str) else {
            tracing::debug!(%data, "gotoStep without a key");
            return;
        };
        if self.wizard.goto_step(key) {
            self.send_button_updates();
        } else {
            tracing::debug!(step = key, "gotoStep for unknown step");
        }
    }

    fn save(&mut self) {
        let arguments = collect_arguments(&self.engine);
        let payload = std::mem::take(&mut self.payload);
        self.payload = finalize(payload, arguments);
        tracing::info!(step = %self.wizard.current_step().key, "activity configured");
        self.channel
            .trigger(HostRequest::UpdateActivity(self.payload.clone()));
    }
}
