use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use stack_hooks_lambda::adapters::aws::S3BucketStore;
use stack_hooks_lambda::adapters::callback::ReqwestCallbackTransport;
use stack_hooks_lambda::handlers::bucket_cleanup::handle_bucket_cleanup_event;
use stack_hooks_lambda::logging::init_logging;
use stack_hooks_lambda::runtime::invocation_context;

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let context = invocation_context(&event.context);
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = S3BucketStore::new(aws_sdk_s3::Client::new(&aws_config));
    let transport = ReqwestCallbackTransport::try_default().map_err(Error::from)?;

    let report = handle_bucket_cleanup_event(event.payload, &context, &store, &transport);
    Ok(report.into_lambda_response())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();
    lambda_runtime::run(service_fn(handle_request)).await
}
