use std::sync::Mutex;

use tracing::info;

/// Append-only diagnostic sink injected through the run context.
///
/// The core never owns a process-wide logger; run-visible decisions (a skill
/// omitted for lack of a platform equivalent, a dependent field skipped, a
/// suggestion fallback taken) go through this capability so the orchestrator
/// decides where they end up. Must be callable from any point without extra
/// synchronization.
pub trait EventSink: Send + Sync {
    fn emit(&self, message: &str);
}

/// Default sink: forwards to the `tracing` pipeline.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, message: &str) {
        info!(target: "formagent::events", "{}", message);
    }
}

/// In-memory sink for tests and for orchestrators that attach run events to
/// their per-target result.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("sink poisoned").clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}

impl EventSink for MemorySink {
    fn emit(&self, message: &str) {
        self.messages
            .lock()
            .expect("sink poisoned")
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_is_append_only_and_ordered() {
        let sink = MemorySink::new();
        sink.emit("first");
        sink.emit("second");
        assert_eq!(sink.messages(), vec!["first", "second"]);
        assert!(sink.contains("sec"));
        assert!(!sink.contains("third"));
    }
}
