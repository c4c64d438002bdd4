use serde_json::Value;
use stack_hooks_core::config::CrawlerConfig;
use stack_hooks_core::error::{ConfigError, HandlerError};
use stack_hooks_core::event::InvocationContext;
use stack_hooks_core::status::MutationOutput;

use crate::adapters::callback::CallbackTransport;
use crate::adapters::crawler::{CrawlerError, CrawlerService};
use crate::dispatcher::dispatch;
use crate::reporter::Report;

pub const COMPONENT: &str = "crawler_init";

/// Starts the cost report crawler on create/apply. Delete has nothing to
/// undo, so it succeeds without needing any configuration.
pub fn handle_crawler_event(
    payload: Value,
    context: &InvocationContext,
    config: Result<CrawlerConfig, ConfigError>,
    crawler: &impl CrawlerService,
    transport: &dyn CallbackTransport,
) -> Report {
    dispatch(payload, context, transport, COMPONENT, |_, invocation| {
        if invocation.phase().is_delete() {
            return Ok(MutationOutput::new("Delete successful"));
        }

        let config = config?;
        start_crawl(&config, crawler)
    })
}

pub fn start_crawl(
    config: &CrawlerConfig,
    crawler: &impl CrawlerService,
) -> Result<MutationOutput, HandlerError> {
    match crawler.start_crawler(&config.crawler_name) {
        Ok(()) => Ok(MutationOutput::new("Create successful")
            .with_data("CrawlerName", config.crawler_name.as_str())),
        Err(CrawlerError::AlreadyRunning { name }) => {
            tracing::info!(
                component = COMPONENT,
                event = "crawler_already_running",
                crawler = name.as_str(),
                "crawler already running, treating start as done"
            );
            Ok(MutationOutput::new("Create successful").with_data("CrawlerName", name))
        }
        Err(CrawlerError::Request(message)) => Err(HandlerError::Mutation(message)),
    }
}
