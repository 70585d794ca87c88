//! Test doubles shared by the unit tests.

use crate::service::request::ServiceRequest;
use crate::service::transport::{HttpTransport, TransportError};
use serde_json::Value as Json;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Scripted transport. Responses are matched by URL prefix; unmatched URLs
/// fail with a 404. Every request is recorded.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<Vec<(String, Result<Json, TransportError>)>>,
    requests: Mutex<Vec<ServiceRequest>>,
    gate: Mutex<Option<Receiver<()>>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A transport whose calls block until the returned sender releases them,
    /// one call per message.
    pub fn gated() -> (Arc<Self>, Sender<()>) {
        let (release_tx, release_rx) = mpsc::channel();
        let transport = Self {
            gate: Mutex::new(Some(release_rx)),
            ..Self::default()
        };
        (Arc::new(transport), release_tx)
    }

    pub fn respond(&self, url_prefix: &str, response: Json) {
        self.routes
            .lock()
            .expect("routes lock")
            .push((url_prefix.to_string(), Ok(response)));
    }

    pub fn fail(&self, url_prefix: &str, status: u16) {
        self.routes.lock().expect("routes lock").push((
            url_prefix.to_string(),
            Err(TransportError::Status {
                status,
                body: String::new(),
            }),
        ));
    }

    pub fn requests(&self) -> Vec<ServiceRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl HttpTransport for FakeTransport {
    fn send(&self, request: &ServiceRequest) -> Result<Json, TransportError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());

        if let Some(gate) = self.gate.lock().expect("gate lock").as_ref() {
            let _ = gate.recv();
        }

        self.routes
            .lock()
            .expect("routes lock")
            .iter()
            .find(|(prefix, _)| request.url.starts_with(prefix.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or(Err(TransportError::Status {
                status: 404,
                body: String::new(),
            }))
    }
}
