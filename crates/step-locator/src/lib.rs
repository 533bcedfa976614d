//! Element resolution for parsed natural-language test steps.
//!
//! The entry point is [`ElementResolver`]: given a descriptive term or an
//! explicit selector hint it runs a bounded cascade of lookup stages (smart
//! wait, immediate lookup, assisted recovery, full fallback sweep, login
//! heuristics, interactive capture) and hands back an owned
//! [`ResolvedElement`] or `Ok(None)` when the page simply has no such
//! element.

pub mod assist;
pub mod capture;
pub mod errors;
pub mod hint;
pub mod resolver;
pub mod scan;
pub mod snippet;
pub mod strategies;
pub mod types;
pub mod visibility;

pub use assist::{AssistError, RetryPolicy, SuggestionClient, SuggestionRequest, SuggestionResponse};
pub use errors::LocatorError;
pub use hint::SelectorHint;
pub use resolver::{wait_for_visible, ElementResolver, ResolveRequest, ResolverConfig};
pub use types::{FallbackStrategy, ResolvedElement};
