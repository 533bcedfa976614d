//! One module per action kind. All handlers share the same shape: take the
//! engine, the step context and the parsed step, return a [`Handled`] or a
//! step error.
//!
//! [`Handled`]: crate::types::Handled

pub(crate) mod click;
pub(crate) mod drag;
pub(crate) mod hover;
pub(crate) mod iframe;
pub(crate) mod navigate;
pub(crate) mod scroll;
pub(crate) mod select;
pub(crate) mod skip;
pub(crate) mod typing;
pub(crate) mod upload;
pub(crate) mod wait;
