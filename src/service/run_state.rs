use crate::core::FieldId;
use std::collections::HashMap;

/// In-flight bookkeeping. A field stays loading until every call it started
/// has settled.
#[derive(Debug, Clone, Default)]
pub struct ServiceRunState {
    running: HashMap<FieldId, usize>,
    sequence: u64,
}

impl ServiceRunState {
    pub fn next_run_id(&mut self) -> u64 {
        self.sequence = self.sequence.saturating_add(1);
        self.sequence
    }

    pub fn on_started(&mut self, field: &FieldId) {
        let count = self.running.entry(field.clone()).or_default();
        *count = count.saturating_add(1);
    }

    pub fn on_finished(&mut self, field: &FieldId) {
        if let Some(count) = self.running.get_mut(field.as_str()) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.running.remove(field.as_str());
            }
        }
    }

    pub fn running_count(&self, field: &str) -> usize {
        self.running.get(field).copied().unwrap_or_default()
    }

    pub fn is_running(&self, field: &str) -> bool {
        self.running_count(field) > 0
    }

    pub fn total_running(&self) -> usize {
        self.running.values().sum()
    }
}
