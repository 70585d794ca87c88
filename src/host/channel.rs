use crate::host::message::HostRequest;

/// Outbound side of the host connection.
pub trait HostChannel {
    fn trigger(&mut self, request: HostRequest);
}

/// Keeps every request in order. Used by the harness in dry runs and by tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingChannel {
    requests: Vec<HostRequest>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[HostRequest] {
        &self.requests
    }

    pub fn take(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn count(&self, name: &str) -> usize {
        self.requests
            .iter()
            .filter(|request| request.name() == name)
            .count()
    }
}

impl HostChannel for RecordingChannel {
    fn trigger(&mut self, request: HostRequest) {
        tracing::trace!(event = request.name(), "host request");
        self.requests.push(request);
    }
}
