use serde_json::Value;
use stack_hooks_core::error::HandlerError;
use stack_hooks_core::event::{
    Invocation, InvocationContext, LifecycleEvent, Phase, BUCKET_NAME, REPORT_NAME,
};
use stack_hooks_core::notification::NotificationConfiguration;
use stack_hooks_core::status::MutationOutput;
use stack_hooks_core::support::{SupportCaseRequest, DEFAULT_CUR_REPORT_NAME};

use crate::adapters::callback::CallbackTransport;
use crate::adapters::object_store::{BucketStore, StorageError};
use crate::adapters::support::SupportCaseFiler;
use crate::dispatcher::dispatch;
use crate::reporter::Report;

pub const COMPONENT: &str = "bucket_notification";

/// Wires object-created notifications from the report bucket to the target
/// function, replacing any previous configuration. Delete clears the
/// configuration before the bucket goes away. When the orchestrator creates
/// the resource a billing backfill case is filed as a best-effort extra;
/// direct applies never file one.
pub fn handle_bucket_notification_event(
    payload: Value,
    context: &InvocationContext,
    store: &impl BucketStore,
    support: &impl SupportCaseFiler,
    transport: &dyn CallbackTransport,
) -> Report {
    dispatch(payload, context, transport, COMPONENT, |event, invocation| {
        let bucket = event.require_property(BUCKET_NAME)?;
        let configuration = NotificationConfiguration::for_phase(event, invocation.phase())?;

        let output = apply_notification_configuration(bucket, &configuration, store)?;

        if files_backfill_case(invocation) {
            request_report_backfill(event, support);
        }

        Ok(output)
    })
}

pub fn apply_notification_configuration(
    bucket: &str,
    configuration: &NotificationConfiguration,
    store: &impl BucketStore,
) -> Result<MutationOutput, HandlerError> {
    let message = if configuration.is_empty() {
        format!("Notification configuration cleared for {bucket}")
    } else {
        format!("Notification configuration applied to {bucket}")
    };
    let output = MutationOutput::new(message).with_data("RuleCount", configuration.rule_count());

    match store.put_notification_configuration(bucket, configuration) {
        Ok(()) => Ok(output),
        Err(StorageError::BucketNotFound { .. }) if configuration.is_empty() => {
            tracing::info!(
                component = COMPONENT,
                event = "bucket_missing",
                bucket,
                "bucket already removed, nothing to clear"
            );
            Ok(output)
        }
        Err(error) => Err(HandlerError::mutation(format!(
            "Failed to apply notification configuration to {bucket}: {error}"
        ))),
    }
}

fn files_backfill_case(invocation: Invocation) -> bool {
    matches!(
        invocation,
        Invocation::Orchestrated {
            phase: Phase::Create
        }
    )
}

/// Never fails the invocation; errors are logged and dropped.
fn request_report_backfill(event: &LifecycleEvent, support: &impl SupportCaseFiler) {
    let report_name = event.property(REPORT_NAME).unwrap_or(DEFAULT_CUR_REPORT_NAME);
    let request = SupportCaseRequest::cur_backfill(report_name);

    match support.create_case(&request) {
        Ok(case_id) => tracing::info!(
            component = COMPONENT,
            event = "support_case_created",
            case_id = case_id.as_str(),
            report_name,
            "backfill support case created"
        ),
        Err(error) => tracing::warn!(
            component = COMPONENT,
            event = "support_case_failed",
            error = error.as_str(),
            report_name,
            "backfill support case could not be created"
        ),
    }
}
