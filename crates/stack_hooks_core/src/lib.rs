//! Shared custom-resource lifecycle primitives.
//!
//! This crate owns the orchestrator wire contract (lifecycle events, status
//! envelopes, direct-invocation results), phase classification, typed
//! configuration and the request models for each mutation. It intentionally
//! excludes AWS SDK and Lambda runtime concerns.

pub mod config;
pub mod error;
pub mod event;
pub mod notification;
pub mod publish;
pub mod status;
pub mod support;
