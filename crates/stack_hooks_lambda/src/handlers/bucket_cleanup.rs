use serde_json::Value;
use stack_hooks_core::error::HandlerError;
use stack_hooks_core::event::{InvocationContext, BUCKET_NAME};
use stack_hooks_core::status::MutationOutput;

use crate::adapters::callback::CallbackTransport;
use crate::adapters::object_store::{BucketStore, StorageError};
use crate::dispatcher::dispatch;
use crate::reporter::Report;

pub const COMPONENT: &str = "bucket_cleanup";

/// Upper bound of keys per batch delete request.
pub const MAX_KEYS_PER_DELETE: usize = 1_000;

/// Empties the named bucket on Delete so the orchestrator can remove it.
/// Every other phase passes without touching the bucket.
pub fn handle_bucket_cleanup_event(
    payload: Value,
    context: &InvocationContext,
    store: &impl BucketStore,
    transport: &dyn CallbackTransport,
) -> Report {
    dispatch(payload, context, transport, COMPONENT, |event, invocation| {
        if !invocation.phase().is_delete() {
            return Ok(MutationOutput::new("All checks passed"));
        }

        let bucket = event.require_property(BUCKET_NAME)?;
        purge_bucket(bucket, store)
    })
}

/// Deletes each listing page as it arrives, so memory stays bounded by one
/// page and a later listing failure keeps the deletions already made.
pub fn purge_bucket(
    bucket: &str,
    store: &impl BucketStore,
) -> Result<MutationOutput, HandlerError> {
    let emptied = |deleted: usize| {
        MutationOutput::new(format!("Successfully emptied bucket {bucket}"))
            .with_data("DeletedObjectCount", deleted)
    };

    tracing::info!(
        component = COMPONENT,
        event = "purge_started",
        bucket,
        "purging bucket"
    );

    let mut deleted = 0usize;
    let mut continuation_token: Option<String> = None;
    loop {
        let page = match store.list_object_page(bucket, continuation_token.as_deref()) {
            Ok(page) => page,
            Err(StorageError::BucketNotFound { .. }) => {
                tracing::info!(
                    component = COMPONENT,
                    event = "bucket_missing",
                    bucket,
                    deleted,
                    "bucket already removed, nothing left to purge"
                );
                return Ok(emptied(deleted));
            }
            Err(error) => {
                return Err(HandlerError::mutation(format!(
                    "Failed to list objects in bucket {bucket} after deleting {deleted} objects: {error}"
                )))
            }
        };

        for batch in page.keys.chunks(MAX_KEYS_PER_DELETE) {
            match store.delete_objects(bucket, batch) {
                Ok(()) => deleted += batch.len(),
                Err(StorageError::BucketNotFound { .. }) => return Ok(emptied(deleted)),
                Err(error) => {
                    return Err(HandlerError::mutation(format!(
                        "Failed to empty bucket {bucket} after deleting {deleted} objects: {error}"
                    )))
                }
            }
        }

        match page.next_token {
            Some(token) => continuation_token = Some(token),
            None => break,
        }
    }

    tracing::info!(
        component = COMPONENT,
        event = "purge_completed",
        bucket,
        deleted,
        "bucket purged"
    );

    Ok(emptied(deleted))
}
