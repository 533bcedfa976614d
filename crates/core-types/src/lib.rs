//! Shared types for the stepwright engine crates.
//!
//! Everything here is created per step by the out-of-scope step parser or
//! sequencer and borrowed by the resolution/execution crates; the only state
//! that outlives a single step is [`PageFlags`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod step;

pub use step::{
    ActionKind, AssertionCondition, AssertionKind, ParsedTestStep, StepAssertion,
};

/// Page-scoped mutable state that survives across steps of one page.
///
/// Owned by the out-of-scope step sequencer and passed by reference; the only
/// flag it carries is the "a form was already submitted" marker consumed by
/// the resolver's submission shortcut.
#[derive(Debug, Default)]
pub struct PageFlags {
    form_submitted: AtomicBool,
}

impl PageFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_form_submitted(&self) {
        self.form_submitted.store(true, Ordering::SeqCst);
    }

    pub fn form_submitted(&self) -> bool {
        self.form_submitted.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.form_submitted.store(false, Ordering::SeqCst);
    }
}

/// Logging callback injected by the orchestrator; every resolution and
/// execution stage reports through it in addition to `tracing`.
pub type StepLog = Arc<dyn Fn(&str, Option<serde_json::Value>) + Send + Sync>;

/// A logging callback that discards everything.
pub fn noop_log() -> StepLog {
    Arc::new(|_msg, _data| {})
}

/// A logging callback that collects messages into a shared buffer, for tests.
pub fn buffer_log(buffer: Arc<std::sync::Mutex<Vec<String>>>) -> StepLog {
    Arc::new(move |msg, _data| {
        if let Ok(mut guard) = buffer.lock() {
            guard.push(msg.to_string());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_flags_round_trip() {
        let flags = PageFlags::new();
        assert!(!flags.form_submitted());
        flags.mark_form_submitted();
        assert!(flags.form_submitted());
        flags.reset();
        assert!(!flags.form_submitted());
    }

    #[test]
    fn buffer_log_collects() {
        let buf = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = buffer_log(buf.clone());
        log("hello", None);
        log("world", Some(serde_json::json!({"k": 1})));
        assert_eq!(buf.lock().unwrap().len(), 2);
    }
}
