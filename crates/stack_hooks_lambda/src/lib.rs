//! AWS-oriented adapters and handlers for the custom-resource lifecycle.
//!
//! This crate owns runtime integration details (Lambda entry points, SDK and
//! callback adapters) together with the dispatcher and status reporter that
//! every handler funnels through. Protocol types live in `stack_hooks_core`.

pub mod adapters;
pub mod dispatcher;
pub mod handlers;
pub mod logging;
pub mod reporter;
pub mod runtime;

#[cfg(test)]
mod test_support;
