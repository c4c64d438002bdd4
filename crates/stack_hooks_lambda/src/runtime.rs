use std::future::Future;

use stack_hooks_core::event::InvocationContext;

/// Runs an async SDK call to completion from synchronous handler code.
///
/// Requires the multi-threaded tokio runtime the Lambda binaries start.
pub fn block_on_current<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

pub fn invocation_context(context: &lambda_runtime::Context) -> InvocationContext {
    InvocationContext {
        request_id: context.request_id.clone(),
        log_stream_name: context.env_config.log_stream.clone(),
    }
}
