use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::HandlerError;
use crate::event::{InvocationContext, LifecycleEvent};

pub const LOG_STREAM_REASON_PREFIX: &str = "See the details in CloudWatch Log Stream: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

impl ResponseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

/// Body of the callback PUT understood by the provisioning orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StatusEnvelope {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: Option<String>,
    pub request_id: Option<String>,
    pub logical_resource_id: Option<String>,
    pub no_echo: bool,
    pub data: Map<String, Value>,
}

/// Return value of a directly invoked handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionResult {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl ExecutionResult {
    /// `body` holds the message JSON-encoded as a string literal.
    pub fn new(status_code: u16, message: &str) -> Self {
        Self {
            status_code,
            body: Value::String(message.to_string()).to_string(),
        }
    }
}

/// What a successful mutation hands back to the reporter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MutationOutput {
    pub message: String,
    pub data: Map<String, Value>,
    pub physical_resource_id: Option<String>,
    pub no_echo: bool,
}

impl MutationOutput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

/// Terminal result of one invocation, before it is shaped for either
/// invocation style.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: ResponseStatus,
    pub status_code: u16,
    pub reason: Option<String>,
    pub data: Map<String, Value>,
    pub physical_resource_id: Option<String>,
    pub no_echo: bool,
}

impl Outcome {
    pub fn from_result(result: Result<MutationOutput, HandlerError>) -> Self {
        match result {
            Ok(output) => Self {
                status: ResponseStatus::Success,
                status_code: 200,
                reason: Some(output.message),
                data: output.data,
                physical_resource_id: output.physical_resource_id,
                no_echo: output.no_echo,
            },
            Err(error) => {
                let message = error.to_string();
                let mut data = Map::new();
                data.insert("message".to_string(), Value::String(message.clone()));
                Self {
                    status: ResponseStatus::Failed,
                    status_code: error.status_code(),
                    reason: Some(message),
                    data,
                    physical_resource_id: None,
                    no_echo: false,
                }
            }
        }
    }

    pub fn resolved_reason(&self, context: &InvocationContext) -> String {
        match self.reason.as_deref() {
            Some(reason) if !reason.trim().is_empty() => reason.to_string(),
            _ => format!("{LOG_STREAM_REASON_PREFIX}{}", context.log_stream_name),
        }
    }

    pub fn to_execution_result(&self, context: &InvocationContext) -> ExecutionResult {
        ExecutionResult::new(self.status_code, &self.resolved_reason(context))
    }

    /// Physical id precedence: mutation output, then the id the orchestrator
    /// already knows, then the log stream name.
    pub fn to_envelope(&self, event: &LifecycleEvent, context: &InvocationContext) -> StatusEnvelope {
        let physical_resource_id = self
            .physical_resource_id
            .clone()
            .or_else(|| {
                event
                    .physical_resource_id
                    .clone()
                    .filter(|id| !id.trim().is_empty())
            })
            .unwrap_or_else(|| context.log_stream_name.clone());

        StatusEnvelope {
            status: self.status,
            reason: self.resolved_reason(context),
            physical_resource_id,
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: self.no_echo,
            data: self.data.clone(),
        }
    }
}
