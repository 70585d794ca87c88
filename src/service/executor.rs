use crate::service::request::{ServiceCompletion, ServiceRequest, execute_request};
use crate::service::transport::HttpTransport;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

/// Runs each request on its own thread; completions come back over a channel
/// and are only applied by whoever drains it.
pub struct ServiceExecutor {
    transport: Arc<dyn HttpTransport>,
    completion_tx: Sender<ServiceCompletion>,
    completion_rx: Receiver<ServiceCompletion>,
}

impl ServiceExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        let (completion_tx, completion_rx) = mpsc::channel::<ServiceCompletion>();
        Self {
            transport,
            completion_tx,
            completion_rx,
        }
    }

    pub fn spawn(&self, request: ServiceRequest) {
        let transport = Arc::clone(&self.transport);
        let completion_tx = self.completion_tx.clone();
        std::thread::spawn(move || {
            let completion = execute_request(transport.as_ref(), request);
            let _ = completion_tx.send(completion);
        });
    }

    /// Completions that already arrived, in arrival order.
    pub fn drain_ready(&self) -> Vec<ServiceCompletion> {
        self.completion_rx.try_iter().collect()
    }

    /// Blocks up to `timeout` for the next completion.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ServiceCompletion> {
        self.completion_rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldId;
    use crate::core::field::HttpMethod;
    use crate::testing::FakeTransport;
    use serde_json::json;
    use std::time::Instant;

    fn request(run_id: u64, url: &str) -> ServiceRequest {
        ServiceRequest {
            field_id: FieldId::new("zip"),
            service_index: 0,
            run_id,
            method: HttpMethod::Get,
            url: url.to_string(),
            body: None,
        }
    }

    #[test]
    fn drain_collects_every_finished_call() {
        let transport = FakeTransport::new();
        transport.respond("https://api.test/ok", json!({"ok": true}));
        let executor = ServiceExecutor::new(transport);

        executor.spawn(request(1, "https://api.test/ok"));
        executor.spawn(request(2, "https://api.test/missing"));

        let mut done = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while done.len() < 2 && Instant::now() < deadline {
            done.extend(executor.drain_ready());
            std::thread::yield_now();
        }
        done.sort_by_key(|completion| completion.run_id);

        assert_eq!(done.len(), 2);
        assert_eq!(done[0].result.as_ref().ok(), Some(&json!({"ok": true})));
        assert!(done[1].result.is_err());
        assert!(executor.drain_ready().is_empty());
        assert!(executor.recv_timeout(Duration::from_millis(10)).is_none());
    }
}
