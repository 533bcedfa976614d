//! Page-script evaluation capability boundary.
//!
//! The resolution and action crates never talk to a browser-automation
//! library directly; they operate against the [`PageContext`] and
//! [`FrameContext`] traits defined here. A production adapter implements the
//! two traits over a real browser protocol; [`mock::MockPage`] implements
//! them over an in-memory element list so the whole engine is testable
//! without a browser.

pub mod errors;
pub mod mock;
pub mod traits;
pub mod types;

pub use errors::*;
pub use traits::*;
pub use types::*;
