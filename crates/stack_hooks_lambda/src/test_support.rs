//! Fakes shared by the handler, dispatcher and reporter tests.

use std::sync::Mutex;

use serde_json::Value;
use stack_hooks_core::event::InvocationContext;

use crate::adapters::callback::CallbackTransport;

/// Records every callback PUT and answers with a fixed response.
pub struct RecordingTransport {
    calls: Mutex<Vec<(String, Vec<u8>)>>,
    response: Result<u16, String>,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::answering(Ok(200))
    }
}

impl RecordingTransport {
    pub fn answering(response: Result<u16, String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            response,
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Bodies parsed as JSON, in delivery order.
    pub fn bodies(&self) -> Vec<Value> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .iter()
            .map(|(_, body)| serde_json::from_slice(body).expect("callback body should be json"))
            .collect()
    }
}

impl CallbackTransport for RecordingTransport {
    fn put_status(&self, url: &str, body: &[u8]) -> Result<u16, String> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push((url.to_string(), body.to_vec()));
        self.response.clone()
    }
}

pub fn sample_context() -> InvocationContext {
    InvocationContext {
        request_id: "invocation-1".to_string(),
        log_stream_name: "log-stream-1".to_string(),
    }
}
