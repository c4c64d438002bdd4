use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{ConfigError, HandlerError};

pub const BUCKET_NAME: &str = "BucketName";
pub const TARGET_LAMBDA_ARN: &str = "TargetLambdaArn";
pub const REPORT_KEY: &str = "ReportKey";
pub const REPORT_NAME: &str = "ReportName";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Create,
    Update,
    Delete,
}

impl Phase {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }

    pub fn is_delete(self) -> bool {
        matches!(self, Self::Delete)
    }
}

/// How the handler was invoked, selected once at entry.
///
/// `Orchestrated` events carry a `RequestType` from the provisioning
/// orchestrator. `Direct` events either name an `Operation` or carry neither
/// field, in which case they default to the create/apply phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Orchestrated { phase: Phase },
    Direct { phase: Phase },
}

impl Invocation {
    pub fn phase(self) -> Phase {
        match self {
            Self::Orchestrated { phase } | Self::Direct { phase } => phase,
        }
    }

    pub fn mode(self) -> &'static str {
        match self {
            Self::Orchestrated { .. } => "orchestrated",
            Self::Direct { .. } => "direct",
        }
    }
}

/// Identity of the current execution, used for default reasons and ids.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvocationContext {
    pub request_id: String,
    pub log_stream_name: String,
}

/// Superset of the orchestrator and direct-invocation payloads.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    #[serde(default)]
    pub request_type: Option<String>,
    #[serde(default)]
    pub resource_properties: Option<Map<String, Value>>,
    #[serde(rename = "ResponseURL", default)]
    pub response_url: Option<String>,
    #[serde(default)]
    pub stack_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub logical_resource_id: Option<String>,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub bucket_name: Option<String>,
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub target_lambda_arn: Option<String>,
    #[serde(default)]
    pub report_key: Option<String>,
    /// `Some(Value::Null)` when the payload carries an explicit `null`.
    #[serde(rename = "roles", default, deserialize_with = "present_value")]
    pub roles: Option<Value>,
}

impl LifecycleEvent {
    /// Decodes an inbound payload.
    ///
    /// A payload that does not fit the contract still yields an event holding
    /// whatever callback and correlation fields could be read, so the failure
    /// can be reported back instead of leaving the orchestrator waiting.
    pub fn decode(payload: Value) -> (Self, Option<HandlerError>) {
        if !payload.is_object() {
            return (
                Self::default(),
                Some(HandlerError::validation(
                    "Event payload must be a JSON object",
                )),
            );
        }

        match serde_json::from_value::<Self>(payload.clone()) {
            Ok(event) => (event, None),
            Err(error) => (
                Self::salvage(&payload),
                Some(HandlerError::validation(format!(
                    "Malformed lifecycle event: {error}"
                ))),
            ),
        }
    }

    fn salvage(payload: &Value) -> Self {
        let text = |name: &str| {
            payload
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Self {
            response_url: text("ResponseURL"),
            stack_id: text("StackId"),
            request_id: text("RequestId"),
            logical_resource_id: text("LogicalResourceId"),
            physical_resource_id: text("PhysicalResourceId"),
            ..Self::default()
        }
    }

    /// `RequestType` wins over `Operation`; neither means create/apply.
    pub fn classify(&self) -> Result<Invocation, HandlerError> {
        if let Some(raw) = non_blank(self.request_type.as_deref()) {
            return Phase::parse(raw)
                .map(|phase| Invocation::Orchestrated { phase })
                .ok_or_else(|| HandlerError::validation(format!("Unsupported RequestType '{raw}'")));
        }

        if let Some(raw) = non_blank(self.operation.as_deref()) {
            return Phase::parse(raw)
                .map(|phase| Invocation::Direct { phase })
                .ok_or_else(|| HandlerError::validation(format!("Unsupported Operation '{raw}'")));
        }

        Ok(Invocation::Direct {
            phase: Phase::Create,
        })
    }

    pub fn callback_url(&self) -> Option<&str> {
        non_blank(self.response_url.as_deref())
    }

    /// Looks a value up in `ResourceProperties`, falling back to the
    /// top-level field of the same name used by direct invocations.
    pub fn property(&self, name: &str) -> Option<&str> {
        let from_properties = self
            .resource_properties
            .as_ref()
            .and_then(|properties| properties.get(name))
            .and_then(Value::as_str);

        non_blank(from_properties).or_else(|| non_blank(self.top_level_field(name)))
    }

    pub fn require_property(&self, name: &'static str) -> Result<&str, ConfigError> {
        self.property(name)
            .ok_or(ConfigError::MissingProperty { name })
    }

    fn top_level_field(&self, name: &str) -> Option<&str> {
        match name {
            BUCKET_NAME => self.bucket_name.as_deref(),
            TARGET_LAMBDA_ARN => self.target_lambda_arn.as_deref(),
            REPORT_KEY => self.report_key.as_deref(),
            _ => None,
        }
    }
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode_ok(payload: Value) -> LifecycleEvent {
        let (event, error) = LifecycleEvent::decode(payload);
        assert!(error.is_none(), "unexpected decode error: {error:?}");
        event
    }

    #[test]
    fn request_type_takes_precedence_over_operation() {
        let event = decode_ok(json!({"RequestType": "Delete", "Operation": "Create"}));
        assert_eq!(
            event.classify().expect("event should classify"),
            Invocation::Orchestrated {
                phase: Phase::Delete
            }
        );
    }

    #[test]
    fn operation_selects_direct_mode() {
        let event = decode_ok(json!({"Operation": "Delete", "BucketName": "b2"}));
        assert_eq!(
            event.classify().expect("event should classify"),
            Invocation::Direct {
                phase: Phase::Delete
            }
        );
    }

    #[test]
    fn empty_event_defaults_to_direct_create() {
        let event = decode_ok(json!({}));
        let invocation = event.classify().expect("event should classify");
        assert_eq!(invocation.phase(), Phase::Create);
        assert_eq!(invocation.mode(), "direct");
        assert!(event.callback_url().is_none());
    }

    #[test]
    fn unknown_request_type_is_a_validation_error() {
        let event = decode_ok(json!({"RequestType": "Rollback"}));
        let error = event.classify().expect_err("classification should fail");
        assert_eq!(error, HandlerError::validation("Unsupported RequestType 'Rollback'"));
    }

    #[test]
    fn blank_request_type_falls_through_to_operation() {
        let event = decode_ok(json!({"RequestType": "", "Operation": "update"}));
        assert_eq!(
            event.classify().expect("event should classify"),
            Invocation::Direct {
                phase: Phase::Update
            }
        );
    }

    #[test]
    fn property_prefers_resource_properties_over_top_level() {
        let event = decode_ok(json!({
            "ResourceProperties": {"BucketName": "from-properties"},
            "BucketName": "from-top-level"
        }));
        assert_eq!(event.property(BUCKET_NAME), Some("from-properties"));

        let direct = decode_ok(json!({"BucketName": "from-top-level"}));
        assert_eq!(direct.property(BUCKET_NAME), Some("from-top-level"));
    }

    #[test]
    fn require_property_reports_missing_name() {
        let event = decode_ok(json!({"ResourceProperties": {"BucketName": "  "}}));
        assert_eq!(
            event.require_property(BUCKET_NAME),
            Err(ConfigError::MissingProperty { name: BUCKET_NAME })
        );
    }

    #[test]
    fn null_resource_properties_are_treated_as_absent() {
        let event = decode_ok(json!({"ResourceProperties": null, "RequestType": "Create"}));
        assert!(event.property(BUCKET_NAME).is_none());
    }

    #[test]
    fn malformed_event_keeps_callback_and_correlation_fields() {
        let (event, error) = LifecycleEvent::decode(json!({
            "RequestType": 7,
            "ResponseURL": "https://callback.example",
            "StackId": "stack-1",
            "RequestId": "request-1",
            "LogicalResourceId": "Cleanup"
        }));

        assert!(matches!(error, Some(HandlerError::Validation(_))));
        assert_eq!(event.callback_url(), Some("https://callback.example"));
        assert_eq!(event.stack_id.as_deref(), Some("stack-1"));
        assert_eq!(event.request_id.as_deref(), Some("request-1"));
        assert_eq!(event.logical_resource_id.as_deref(), Some("Cleanup"));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let (event, error) = LifecycleEvent::decode(json!(["not", "an", "event"]));
        assert_eq!(event, LifecycleEvent::default());
        assert_eq!(
            error,
            Some(HandlerError::validation("Event payload must be a JSON object"))
        );
    }

    #[test]
    fn explicit_null_roles_are_kept_apart_from_absent_roles() {
        assert_eq!(decode_ok(json!({"roles": null})).roles, Some(Value::Null));
        assert_eq!(decode_ok(json!({})).roles, None);
    }
}
