use serde::Serialize;
use serde_json::{json, Value};

use crate::config::PublisherConfig;
use crate::error::HandlerError;

/// Value of the `Type` message attribute consumers filter on.
pub const NOTIFICATION_MESSAGE_TYPE: &str = "CloudFixResourceNotification";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceNotification {
    pub tenant_id: String,
    pub external_id: String,
    pub roles: Value,
}

impl ResourceNotification {
    pub fn new(config: &PublisherConfig, roles: Option<&Value>) -> Self {
        Self {
            tenant_id: config.tenant_id.clone(),
            external_id: config.external_id.clone(),
            roles: roles.cloned().unwrap_or_else(|| json!({})),
        }
    }

    pub fn to_message(&self) -> Result<String, HandlerError> {
        serde_json::to_string(self).map_err(|error| {
            HandlerError::mutation(format!("Failed to serialize notification message: {error}"))
        })
    }
}
