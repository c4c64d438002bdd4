use serde_json::Value;
use stack_hooks_core::config::PublisherConfig;
use stack_hooks_core::error::{ConfigError, HandlerError};
use stack_hooks_core::event::{InvocationContext, LifecycleEvent};
use stack_hooks_core::publish::{ResourceNotification, NOTIFICATION_MESSAGE_TYPE};
use stack_hooks_core::status::MutationOutput;

use crate::adapters::callback::CallbackTransport;
use crate::adapters::publisher::MessagePublisher;
use crate::dispatcher::dispatch;
use crate::reporter::Report;

pub const COMPONENT: &str = "resource_notification";

/// Announces a provisioned tenant (ids plus role map) on the configured
/// topic. Delete publishes nothing.
pub fn handle_publish_event(
    payload: Value,
    context: &InvocationContext,
    config: Result<PublisherConfig, ConfigError>,
    publisher: &impl MessagePublisher,
    transport: &dyn CallbackTransport,
) -> Report {
    dispatch(payload, context, transport, COMPONENT, |event, invocation| {
        if invocation.phase().is_delete() {
            return Ok(MutationOutput::new("Delete successful"));
        }

        let config = config?;
        publish_notification(event, &config, publisher)
    })
}

pub fn publish_notification(
    event: &LifecycleEvent,
    config: &PublisherConfig,
    publisher: &impl MessagePublisher,
) -> Result<MutationOutput, HandlerError> {
    let message = ResourceNotification::new(config, event.roles.as_ref()).to_message()?;

    let message_id = publisher
        .publish(&config.topic_arn, &message, NOTIFICATION_MESSAGE_TYPE)
        .map_err(|error| {
            HandlerError::mutation(format!("Failed to publish notification: {error}"))
        })?;

    tracing::info!(
        component = COMPONENT,
        event = "notification_published",
        message_id = message_id.as_str(),
        topic_arn = config.topic_arn.as_str(),
        "notification published"
    );

    Ok(
        MutationOutput::new(format!("Successfully published notification: {message_id}"))
            .with_data("MessageId", message_id),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use stack_hooks_core::config::{EXTERNAL_ID, SNS_TOPIC_ARN, TENANT_ID};
    use stack_hooks_core::status::ExecutionResult;

    use super::*;
    use crate::test_support::{sample_context, RecordingTransport};

    struct Published {
        topic_arn: String,
        message: Value,
        message_type: String,
    }

    struct RecordingPublisher {
        published: Mutex<Vec<Published>>,
        fail: bool,
    }

    impl RecordingPublisher {
        fn new(fail: bool) -> Self {
            Self {
                published: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    impl MessagePublisher for RecordingPublisher {
        fn publish(
            &self,
            topic_arn: &str,
            message: &str,
            message_type: &str,
        ) -> Result<String, String> {
            if self.fail {
                return Err("AuthorizationError".to_string());
            }
            let message = serde_json::from_str(message).map_err(|error| error.to_string())?;
            self.published.lock().expect("poisoned mutex").push(Published {
                topic_arn: topic_arn.to_string(),
                message,
                message_type: message_type.to_string(),
            });
            Ok("msg-1".to_string())
        }
    }

    fn configured() -> Result<PublisherConfig, ConfigError> {
        Ok(PublisherConfig {
            topic_arn: "arn:aws:sns:us-east-1:123456789012:tenants".to_string(),
            tenant_id: "tenant-7".to_string(),
            external_id: "external-9".to_string(),
        })
    }

    #[test]
    fn create_publishes_tenant_message_with_type_attribute() {
        let publisher = RecordingPublisher::new(false);
        let transport = RecordingTransport::default();

        handle_publish_event(
            json!({
                "RequestType": "Create",
                "ResponseURL": "https://x",
                "roles": {"ReadOnly": "arn:aws:iam::123456789012:role/read"}
            }),
            &sample_context(),
            configured(),
            &publisher,
            &transport,
        );

        let published = publisher.published.lock().expect("poisoned mutex");
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic_arn, "arn:aws:sns:us-east-1:123456789012:tenants");
        assert_eq!(published[0].message_type, "CloudFixResourceNotification");
        assert_eq!(
            published[0].message,
            json!({
                "tenant_id": "tenant-7",
                "external_id": "external-9",
                "roles": {"ReadOnly": "arn:aws:iam::123456789012:role/read"}
            })
        );

        let bodies = transport.bodies();
        assert_eq!(bodies[0]["Status"], "SUCCESS");
        assert_eq!(
            bodies[0]["Reason"],
            "Successfully published notification: msg-1"
        );
        assert_eq!(bodies[0]["Data"]["MessageId"], "msg-1");
    }

    #[test]
    fn delete_publishes_nothing() {
        let publisher = RecordingPublisher::new(false);
        let transport = RecordingTransport::default();

        let report = handle_publish_event(
            json!({"Operation": "Delete"}),
            &sample_context(),
            configured(),
            &publisher,
            &transport,
        );

        assert!(publisher.published.lock().expect("poisoned mutex").is_empty());
        assert_eq!(report, Report::Direct(ExecutionResult::new(200, "Delete successful")));
    }

    #[test]
    fn missing_environment_lists_every_absent_name() {
        let publisher = RecordingPublisher::new(false);
        let transport = RecordingTransport::default();

        let report = handle_publish_event(
            json!({}),
            &sample_context(),
            PublisherConfig::from_lookup(|_| None),
            &publisher,
            &transport,
        );

        assert_eq!(
            report,
            Report::Direct(ExecutionResult::new(
                400,
                &format!(
                    "Missing required environment variables: {SNS_TOPIC_ARN}, {TENANT_ID}, {EXTERNAL_ID}"
                )
            ))
        );
    }

    #[test]
    fn publish_failure_reports_failed() {
        let publisher = RecordingPublisher::new(true);
        let transport = RecordingTransport::default();

        handle_publish_event(
            json!({"RequestType": "Update", "ResponseURL": "https://x"}),
            &sample_context(),
            configured(),
            &publisher,
            &transport,
        );

        let bodies = transport.bodies();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["Status"], "FAILED");
        assert_eq!(
            bodies[0]["Reason"],
            "Failed to publish notification: AuthorizationError"
        );
    }
}
