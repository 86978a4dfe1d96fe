use crate::render::{Renderer, Traces};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    ReplaceAll(Traces),
    Clear,
}

/// Renderer remembering every call. Clones share the same record.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    events: Arc<Mutex<Vec<RenderEvent>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().clone()
    }

    /// Traces currently on the chart.
    pub fn last_traces(&self) -> Option<Traces> {
        match self.events.lock().last() {
            Some(RenderEvent::ReplaceAll(traces)) => Some(traces.clone()),
            _ => None,
        }
    }
}

impl Renderer for RecordingRenderer {
    fn replace_all(&self, traces: &Traces) {
        self.events.lock().push(RenderEvent::ReplaceAll(traces.clone()));
    }

    fn clear(&self) {
        self.events.lock().push(RenderEvent::Clear);
    }
}
