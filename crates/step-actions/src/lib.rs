//! Action execution for parsed natural-language test steps.
//!
//! [`StepEngine`] dispatches each [`ParsedTestStep`] to its handler: clicks
//! race a navigation wait and apply post-click settle rules, selects cover
//! both native and custom dropdowns, iframe switches hand back a new active
//! frame, and assertion steps run through the typed assertion engine.
//! Targets resolve through `step-locator`'s cascade; a missing element only
//! fails the step when the handler has no legitimate degradation (scroll,
//! for instance, falls back to a generic viewport scroll).
//!
//! [`ParsedTestStep`]: stepwright_core_types::ParsedTestStep

pub mod assertions;
pub mod engine;
pub mod errors;
mod handlers;
pub mod quirks;
pub mod types;

pub use engine::{EngineConfig, StepEngine};
pub use errors::ActionError;
pub use quirks::{QuirkRegistry, QuirkRule};
pub use types::{StepCtx, StepOutcome, StepReport};
