use serde_json::{json, Value};
use stack_hooks_core::event::{InvocationContext, LifecycleEvent};
use stack_hooks_core::status::{ExecutionResult, Outcome, ResponseStatus, StatusEnvelope};

use crate::adapters::callback::CallbackTransport;

/// The single terminal status emitted for an invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Callback {
        envelope: StatusEnvelope,
        delivered: bool,
    },
    Direct(ExecutionResult),
}

impl Report {
    pub fn status(&self) -> ResponseStatus {
        match self {
            Self::Callback { envelope, .. } => envelope.status,
            Self::Direct(result) if (200..300).contains(&result.status_code) => {
                ResponseStatus::Success
            }
            Self::Direct(_) => ResponseStatus::Failed,
        }
    }

    /// Value handed back to the Lambda runtime.
    pub fn into_lambda_response(self) -> Value {
        match self {
            Self::Callback {
                envelope,
                delivered,
            } => json!({
                "Status": envelope.status,
                "Reason": envelope.reason,
                "Delivered": delivered,
            }),
            Self::Direct(result) => json!({
                "statusCode": result.status_code,
                "body": result.body,
            }),
        }
    }
}

/// Delivers the terminal status for one invocation.
///
/// Delivery is fire-and-forget: a failed or rejected callback is logged and
/// the invocation still completes, since re-raising would make the runtime
/// retry the mutation.
pub struct StatusReporter<'a> {
    transport: &'a dyn CallbackTransport,
    context: &'a InvocationContext,
    component: &'static str,
}

impl<'a> StatusReporter<'a> {
    pub fn new(
        transport: &'a dyn CallbackTransport,
        context: &'a InvocationContext,
        component: &'static str,
    ) -> Self {
        Self {
            transport,
            context,
            component,
        }
    }

    pub fn report(&self, event: &LifecycleEvent, outcome: Outcome) -> Report {
        let Some(url) = event.callback_url() else {
            let result = outcome.to_execution_result(self.context);
            tracing::info!(
                component = self.component,
                event = "status_returned",
                status_code = result.status_code,
                "returning status to direct invoker"
            );
            return Report::Direct(result);
        };

        let envelope = outcome.to_envelope(event, self.context);
        let delivered = self.deliver(url, &envelope);
        Report::Callback {
            envelope,
            delivered,
        }
    }

    fn deliver(&self, url: &str, envelope: &StatusEnvelope) -> bool {
        let body = match serde_json::to_vec(envelope) {
            Ok(body) => body,
            Err(error) => {
                tracing::error!(
                    component = self.component,
                    event = "status_delivery_failed",
                    error = %error,
                    "failed to serialize status envelope"
                );
                return false;
            }
        };

        match self.transport.put_status(url, &body) {
            Ok(status_code) if (200..300).contains(&status_code) => {
                tracing::info!(
                    component = self.component,
                    event = "status_delivered",
                    status = envelope.status.as_str(),
                    status_code,
                    request_id = envelope.request_id.as_deref().unwrap_or_default(),
                    "status callback delivered"
                );
                true
            }
            Ok(status_code) => {
                tracing::error!(
                    component = self.component,
                    event = "status_delivery_failed",
                    status = envelope.status.as_str(),
                    status_code,
                    "status callback rejected"
                );
                false
            }
            Err(error) => {
                tracing::error!(
                    component = self.component,
                    event = "status_delivery_failed",
                    status = envelope.status.as_str(),
                    error = %error,
                    "status callback failed"
                );
                false
            }
        }
    }
}
