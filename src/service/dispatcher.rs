use crate::core::FieldId;
use crate::core::field::WebServiceConfig;
use crate::core::form_state::FormState;
use crate::service::executor::ServiceExecutor;
use crate::service::request::{ServiceCompletion, ServiceRequest};
use crate::service::run_state::ServiceRunState;
use crate::service::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;

/// Issues configured web-service calls and tracks which fields are loading.
pub struct WebServiceDispatcher {
    executor: ServiceExecutor,
    runs: ServiceRunState,
}

impl WebServiceDispatcher {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            executor: ServiceExecutor::new(transport),
            runs: ServiceRunState::default(),
        }
    }

    /// Resolves and starts one call. Returns the run id, or `None` when the
    /// request could not be built (the reason is logged).
    pub fn dispatch(
        &mut self,
        field_id: &FieldId,
        service_index: usize,
        config: &WebServiceConfig,
        form: &FormState,
    ) -> Option<u64> {
        let run_id = self.runs.next_run_id();
        let request = match ServiceRequest::prepare(field_id, service_index, run_id, config, form) {
            Ok(request) => request,
            Err(err) => {
                tracing::error!(
                    field = %field_id,
                    service = service_index,
                    url = %config.url,
                    error = %err,
                    "web service call not issued"
                );
                return None;
            }
        };

        tracing::debug!(
            field = %field_id,
            run_id,
            method = %request.method,
            url = %request.url,
            "web service call started"
        );
        self.runs.on_started(field_id);
        self.executor.spawn(request);
        Some(run_id)
    }

    /// Completions that have already arrived, with their loading markers released.
    pub fn drain_ready(&mut self) -> Vec<ServiceCompletion> {
        let completions = self.executor.drain_ready();
        for completion in &completions {
            self.settle(completion);
        }
        completions
    }

    /// Waits up to `timeout` for the next completion while calls are in flight.
    pub fn wait_next(&mut self, timeout: Duration) -> Option<ServiceCompletion> {
        if self.pending() == 0 {
            return None;
        }
        let completion = self.executor.recv_timeout(timeout)?;
        self.settle(&completion);
        Some(completion)
    }

    pub fn is_loading(&self, field: &str) -> bool {
        self.runs.is_running(field)
    }

    pub fn pending(&self) -> usize {
        self.runs.total_running()
    }

    fn settle(&mut self, completion: &ServiceCompletion) {
        self.runs.on_finished(&completion.field_id);
        if let Err(err) = &completion.result {
            tracing::error!(
                field = %completion.field_id,
                service = completion.service_index,
                run_id = completion.run_id,
                error = %err,
                "web service call failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;
    use crate::testing::FakeTransport;
    use serde_json::json;

    fn form() -> FormState {
        let mut form = FormState::new();
        form.set("zip", Value::text("01000"));
        form
    }

    #[test]
    fn loading_marker_tracks_overlapping_calls() {
        let (transport, release) = FakeTransport::gated();
        transport.respond("https://api.test", json!({"ok": true}));
        let mut dispatcher = WebServiceDispatcher::new(transport.clone());
        let field = FieldId::new("zip");
        let config = WebServiceConfig::new("https://api.test/{{zip}}", "change");

        dispatcher.dispatch(&field, 0, &config, &form()).expect("first call");
        dispatcher.dispatch(&field, 0, &config, &form()).expect("second call");
        assert!(dispatcher.is_loading("zip"));
        assert_eq!(dispatcher.pending(), 2);

        release.send(()).expect("release first");
        let first = dispatcher
            .wait_next(Duration::from_secs(5))
            .expect("first completion");
        assert_eq!(first.result, Ok(json!({"ok": true})));
        assert!(dispatcher.is_loading("zip"));

        release.send(()).expect("release second");
        dispatcher
            .wait_next(Duration::from_secs(5))
            .expect("second completion");
        assert!(!dispatcher.is_loading("zip"));
        assert!(dispatcher.wait_next(Duration::from_millis(10)).is_none());
    }

    #[test]
    fn failed_calls_release_the_marker() {
        let transport = FakeTransport::new();
        transport.fail("https://api.test", 500);
        let mut dispatcher = WebServiceDispatcher::new(transport.clone());
        let field = FieldId::new("zip");
        let config = WebServiceConfig::new("https://api.test", "change");

        dispatcher.dispatch(&field, 0, &config, &form()).expect("call");
        let completion = dispatcher
            .wait_next(Duration::from_secs(5))
            .expect("completion");
        assert!(completion.result.is_err());
        assert!(!dispatcher.is_loading("zip"));
    }

    #[test]
    fn unparseable_body_issues_no_call() {
        let transport = FakeTransport::new();
        let mut dispatcher = WebServiceDispatcher::new(transport.clone());
        let config = WebServiceConfig::new("https://api.test", "change")
            .with_method("POST")
            .with_body("{not json");

        assert!(dispatcher.dispatch(&FieldId::new("zip"), 0, &config, &form()).is_none());
        assert!(!dispatcher.is_loading("zip"));
        assert!(transport.requests().is_empty());
    }
}
