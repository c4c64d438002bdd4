use stack_hooks_core::notification::NotificationConfiguration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("bucket '{bucket}' does not exist")]
    BucketNotFound { bucket: String },
    #[error("{0}")]
    Request(String),
}

/// One page of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    /// Present while more pages remain.
    pub next_token: Option<String>,
}

pub trait BucketStore {
    /// Lists the page after `continuation_token`, or the first page.
    fn list_object_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, StorageError>;

    fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), StorageError>;

    /// Replaces the bucket's notification configuration wholesale.
    fn put_notification_configuration(
        &self,
        bucket: &str,
        configuration: &NotificationConfiguration,
    ) -> Result<(), StorageError>;
}
