use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;
use stack_hooks_core::error::HandlerError;
use stack_hooks_core::event::{Invocation, InvocationContext, LifecycleEvent};
use stack_hooks_core::status::{MutationOutput, Outcome};

use crate::adapters::callback::CallbackTransport;
use crate::reporter::{Report, StatusReporter};

/// Runs one invocation end to end: decode, classify, mutate, report.
///
/// Every path, including a malformed payload or a panic inside `mutation`,
/// ends in exactly one call to the status reporter.
pub fn dispatch<F>(
    payload: Value,
    context: &InvocationContext,
    transport: &dyn CallbackTransport,
    component: &'static str,
    mutation: F,
) -> Report
where
    F: FnOnce(&LifecycleEvent, Invocation) -> Result<MutationOutput, HandlerError>,
{
    tracing::info!(
        component,
        event = "event_received",
        request_id = context.request_id.as_str(),
        payload = %payload,
        "event received"
    );

    let (event, decode_error) = LifecycleEvent::decode(payload);
    let result = match decode_error {
        Some(error) => Err(error),
        None => event
            .classify()
            .and_then(|invocation| run_mutation(&event, invocation, component, mutation)),
    };

    match &result {
        Ok(output) => tracing::info!(
            component,
            event = "mutation_completed",
            message = output.message.as_str(),
            "mutation completed"
        ),
        Err(error) => tracing::error!(
            component,
            event = "mutation_failed",
            error_kind = error.kind(),
            error = %error,
            "mutation failed"
        ),
    }

    StatusReporter::new(transport, context, component).report(&event, Outcome::from_result(result))
}

fn run_mutation<F>(
    event: &LifecycleEvent,
    invocation: Invocation,
    component: &'static str,
    mutation: F,
) -> Result<MutationOutput, HandlerError>
where
    F: FnOnce(&LifecycleEvent, Invocation) -> Result<MutationOutput, HandlerError>,
{
    tracing::info!(
        component,
        event = "phase_classified",
        mode = invocation.mode(),
        phase = invocation.phase().as_str(),
        "dispatching lifecycle phase"
    );

    catch_unwind(AssertUnwindSafe(|| mutation(event, invocation))).unwrap_or_else(|panic| {
        Err(HandlerError::mutation(format!(
            "Handler panicked: {}",
            panic_message(panic.as_ref())
        )))
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}
