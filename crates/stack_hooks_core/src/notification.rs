use crate::error::HandlerError;
use crate::event::{LifecycleEvent, Phase, REPORT_KEY, TARGET_LAMBDA_ARN};

pub const OBJECT_CREATED_EVENT: &str = "s3:ObjectCreated:*";

/// Rule invoking a function for objects created under `prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionNotificationRule {
    pub events: Vec<String>,
    pub lambda_function_arn: String,
    pub prefix: String,
}

/// Complete notification configuration for a bucket.
///
/// Applying it replaces whatever the bucket had before, so the empty value
/// clears every rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationConfiguration {
    pub function_rules: Vec<FunctionNotificationRule>,
}

impl NotificationConfiguration {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn object_created(lambda_function_arn: &str, prefix: &str) -> Self {
        Self {
            function_rules: vec![FunctionNotificationRule {
                events: vec![OBJECT_CREATED_EVENT.to_string()],
                lambda_function_arn: lambda_function_arn.to_string(),
                prefix: prefix.to_string(),
            }],
        }
    }

    /// Delete always yields the empty configuration. Every other phase needs
    /// the target function and the key prefix.
    pub fn for_phase(event: &LifecycleEvent, phase: Phase) -> Result<Self, HandlerError> {
        if phase.is_delete() {
            return Ok(Self::empty());
        }

        let target_arn = event.require_property(TARGET_LAMBDA_ARN)?;
        let prefix = event.require_property(REPORT_KEY)?;
        Ok(Self::object_created(target_arn, prefix))
    }

    pub fn is_empty(&self) -> bool {
        self.function_rules.is_empty()
    }

    pub fn rule_count(&self) -> usize {
        self.function_rules.len()
    }
}
