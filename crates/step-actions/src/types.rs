//! Per-step execution context and reporting types.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use page_bridge::{FrameContext, PageContext};
use stepwright_core_types::{noop_log, ActionKind, PageFlags, StepLog};

/// Everything a handler needs for one step: the page, the active frame
/// (main document or an entered iframe), the page-scoped flags, and the
/// cancellation/deadline pair the sequencer controls.
#[derive(Clone)]
pub struct StepCtx {
    pub page: Arc<dyn PageContext>,
    pub frame: Arc<dyn FrameContext>,
    pub flags: Arc<PageFlags>,
    pub deadline: Instant,
    /// Budget that produced `deadline`, kept for diagnostics.
    pub budget: Duration,
    pub cancel: CancellationToken,
    pub log: StepLog,
    pub step_id: Uuid,
}

impl StepCtx {
    pub fn new(page: Arc<dyn PageContext>, flags: Arc<PageFlags>) -> Self {
        let frame = page.main_frame();
        let budget = Duration::from_secs(60);
        Self {
            page,
            frame,
            flags,
            deadline: Instant::now() + budget,
            budget,
            cancel: CancellationToken::new(),
            log: noop_log(),
            step_id: Uuid::new_v4(),
        }
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self.deadline = Instant::now() + budget;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_log(mut self, log: StepLog) -> Self {
        self.log = log;
        self
    }

    /// Same context, different active frame. Used after an iframe switch.
    pub fn with_frame(mut self, frame: Arc<dyn FrameContext>) -> Self {
        self.frame = frame;
        self.step_id = Uuid::new_v4();
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_timeout(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn log(&self, message: &str, data: Option<Value>) {
        (self.log)(message, data);
    }
}

/// Completed-step record handed back to the sequencer.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub step_id: Uuid,
    pub action: ActionKind,
    pub index: usize,
    pub detail: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// In-flight report, closed by [`PendingReport::finish`].
pub struct PendingReport {
    step_id: Uuid,
    action: ActionKind,
    index: usize,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl PendingReport {
    pub fn start(step_id: Uuid, action: ActionKind, index: usize) -> Self {
        Self {
            step_id,
            action,
            index,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn finish(self, detail: impl Into<String>) -> StepReport {
        StepReport {
            step_id: self.step_id,
            action: self.action,
            index: self.index,
            detail: detail.into(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            duration_ms: self.started.elapsed().as_millis() as u64,
        }
    }
}

/// What a handler produced: the report, plus a new active frame when the
/// step was an iframe or main-content switch.
pub struct StepOutcome {
    pub report: StepReport,
    pub frame_switch: Option<Arc<dyn FrameContext>>,
}

impl fmt::Debug for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepOutcome")
            .field("report", &self.report)
            .field("frame_switch", &self.frame_switch.is_some())
            .finish()
    }
}

/// Handler-internal result, wrapped into a [`StepOutcome`] by the engine.
pub(crate) struct Handled {
    pub detail: String,
    pub frame_switch: Option<Arc<dyn FrameContext>>,
}

impl Handled {
    pub fn done(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            frame_switch: None,
        }
    }

    pub fn switched(detail: impl Into<String>, frame: Arc<dyn FrameContext>) -> Self {
        Self {
            detail: detail.into(),
            frame_switch: Some(frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_bridge::mock::MockPage;

    #[test]
    fn report_carries_timing() {
        let pending = PendingReport::start(Uuid::new_v4(), ActionKind::Click, 0);
        let report = pending.finish("clicked #go");
        assert_eq!(report.action, ActionKind::Click);
        assert_eq!(report.detail, "clicked #go");
        assert!(report.finished_at >= report.started_at);
    }

    #[test]
    fn outcome_is_debuggable() {
        let report = PendingReport::start(Uuid::new_v4(), ActionKind::Click, 0).finish("ok");
        let outcome = StepOutcome {
            report,
            frame_switch: None,
        };
        let rendered = format!("{outcome:?}");
        assert!(rendered.contains("StepOutcome"));
        assert!(rendered.contains("frame_switch: false"));
    }

    #[tokio::test]
    async fn ctx_deadline_and_cancel() {
        let page = Arc::new(MockPage::new("https://app.test/"));
        let ctx = StepCtx::new(page, Arc::new(PageFlags::new()))
            .with_budget(Duration::from_millis(50));
        assert!(!ctx.is_timeout());
        assert!(ctx.remaining() <= Duration::from_millis(50));
        ctx.cancel.cancel();
        assert!(ctx.is_cancelled());
    }
}
