//! SDK-backed adapter implementations used by the Lambda binaries.

use aws_sdk_glue::operation::start_crawler::StartCrawlerError;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::types::{
    Delete, Event, FilterRule, FilterRuleName, LambdaFunctionConfiguration,
    NotificationConfiguration as S3NotificationConfiguration, NotificationConfigurationFilter,
    ObjectIdentifier, S3KeyFilter,
};
use aws_sdk_sns::types::MessageAttributeValue;
use stack_hooks_core::notification::NotificationConfiguration;
use stack_hooks_core::support::SupportCaseRequest;

use crate::adapters::crawler::{CrawlerError, CrawlerService};
use crate::adapters::object_store::{BucketStore, ObjectPage, StorageError};
use crate::adapters::publisher::MessagePublisher;
use crate::adapters::support::SupportCaseFiler;
use crate::runtime::block_on_current;

/// The support API is only served from this region.
pub const SUPPORT_API_REGION: &str = "us-east-1";

const NO_SUCH_BUCKET: &str = "NoSuchBucket";

pub struct S3BucketStore {
    s3_client: aws_sdk_s3::Client,
}

impl S3BucketStore {
    pub fn new(s3_client: aws_sdk_s3::Client) -> Self {
        Self { s3_client }
    }
}

impl BucketStore for S3BucketStore {
    fn list_object_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, StorageError> {
        let client = self.s3_client.clone();

        block_on_current(async move {
            let output = client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(continuation_token.map(str::to_string))
                .send()
                .await
                .map_err(|error| storage_error(bucket, "list objects", error))?;

            let keys = output
                .contents()
                .iter()
                .filter_map(|object| object.key().map(str::to_string))
                .collect();
            let next_token = if output.is_truncated().unwrap_or(false) {
                output.next_continuation_token().map(str::to_string)
            } else {
                None
            };

            Ok(ObjectPage { keys, next_token })
        })
    }

    fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), StorageError> {
        if keys.is_empty() {
            return Ok(());
        }

        let identifiers = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| StorageError::Request(format!("invalid object identifier: {error}")))?;
        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .map_err(|error| StorageError::Request(format!("invalid delete request: {error}")))?;
        let client = self.s3_client.clone();

        let output = block_on_current(async move {
            client
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|error| storage_error(bucket, "delete objects", error))
        })?;

        match output.errors().first() {
            None => Ok(()),
            Some(failed) => Err(StorageError::Request(format!(
                "failed to delete object '{}' from s3: {} ({} of {} keys failed)",
                failed.key().unwrap_or_default(),
                failed.message().unwrap_or("unknown error"),
                output.errors().len(),
                keys.len(),
            ))),
        }
    }

    fn put_notification_configuration(
        &self,
        bucket: &str,
        configuration: &NotificationConfiguration,
    ) -> Result<(), StorageError> {
        let notification_configuration = to_s3_notification_configuration(configuration)?;
        let client = self.s3_client.clone();

        block_on_current(async move {
            client
                .put_bucket_notification_configuration()
                .bucket(bucket)
                .notification_configuration(notification_configuration)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| storage_error(bucket, "put notification configuration", error))
        })
    }
}

fn to_s3_notification_configuration(
    configuration: &NotificationConfiguration,
) -> Result<S3NotificationConfiguration, StorageError> {
    let mut function_configurations = Vec::with_capacity(configuration.rule_count());
    for rule in &configuration.function_rules {
        let filter = NotificationConfigurationFilter::builder()
            .key(
                S3KeyFilter::builder()
                    .filter_rules(
                        FilterRule::builder()
                            .name(FilterRuleName::Prefix)
                            .value(&rule.prefix)
                            .build(),
                    )
                    .build(),
            )
            .build();

        let function_configuration = LambdaFunctionConfiguration::builder()
            .lambda_function_arn(&rule.lambda_function_arn)
            .set_events(Some(
                rule.events
                    .iter()
                    .map(|event| Event::from(event.as_str()))
                    .collect(),
            ))
            .filter(filter)
            .build()
            .map_err(|error| {
                StorageError::Request(format!("invalid notification rule: {error}"))
            })?;
        function_configurations.push(function_configuration);
    }

    let function_configurations = if function_configurations.is_empty() {
        None
    } else {
        Some(function_configurations)
    };

    Ok(S3NotificationConfiguration::builder()
        .set_lambda_function_configurations(function_configurations)
        .build())
}

fn storage_error<E, R>(bucket: &str, action: &str, error: SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    if error.code() == Some(NO_SUCH_BUCKET) {
        return StorageError::BucketNotFound {
            bucket: bucket.to_string(),
        };
    }

    StorageError::Request(format!(
        "failed to {action} in s3: {}",
        DisplayErrorContext(&error)
    ))
}

pub struct GlueCrawlerService {
    glue_client: aws_sdk_glue::Client,
}

impl GlueCrawlerService {
    pub fn new(glue_client: aws_sdk_glue::Client) -> Self {
        Self { glue_client }
    }
}

impl CrawlerService for GlueCrawlerService {
    fn start_crawler(&self, name: &str) -> Result<(), CrawlerError> {
        let client = self.glue_client.clone();

        block_on_current(async move {
            client
                .start_crawler()
                .name(name)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| crawler_error(name, error))
        })
    }
}

fn crawler_error<R>(name: &str, error: SdkError<StartCrawlerError, R>) -> CrawlerError
where
    R: std::fmt::Debug,
{
    let already_running = error
        .as_service_error()
        .is_some_and(StartCrawlerError::is_crawler_running_exception);
    if already_running {
        return CrawlerError::AlreadyRunning {
            name: name.to_string(),
        };
    }

    CrawlerError::Request(format!(
        "failed to start crawler '{name}': {}",
        aws_sdk_glue::error::DisplayErrorContext(&error)
    ))
}

pub struct SnsMessagePublisher {
    sns_client: aws_sdk_sns::Client,
}

impl SnsMessagePublisher {
    pub fn new(sns_client: aws_sdk_sns::Client) -> Self {
        Self { sns_client }
    }
}

impl MessagePublisher for SnsMessagePublisher {
    fn publish(&self, topic_arn: &str, message: &str, message_type: &str) -> Result<String, String> {
        let type_attribute = MessageAttributeValue::builder()
            .data_type("String")
            .string_value(message_type)
            .build()
            .map_err(|error| format!("invalid message attribute: {error}"))?;
        let client = self.sns_client.clone();

        block_on_current(async move {
            client
                .publish()
                .topic_arn(topic_arn)
                .message(message)
                .message_attributes("Type", type_attribute)
                .send()
                .await
                .map(|output| output.message_id().unwrap_or_default().to_string())
                .map_err(|error| {
                    format!(
                        "failed to publish to sns: {}",
                        aws_sdk_sns::error::DisplayErrorContext(&error)
                    )
                })
        })
    }
}

pub struct AwsSupportCaseFiler {
    support_client: aws_sdk_support::Client,
}

impl AwsSupportCaseFiler {
    pub fn new(support_client: aws_sdk_support::Client) -> Self {
        Self { support_client }
    }

    /// Builds a client pinned to the support API region regardless of where
    /// the function runs.
    pub fn from_shared_config(config: &aws_config::SdkConfig) -> Self {
        let support_config = aws_sdk_support::config::Builder::from(config)
            .region(aws_sdk_support::config::Region::new(SUPPORT_API_REGION))
            .build();
        Self::new(aws_sdk_support::Client::from_conf(support_config))
    }
}

impl SupportCaseFiler for AwsSupportCaseFiler {
    fn create_case(&self, request: &SupportCaseRequest) -> Result<String, String> {
        let client = self.support_client.clone();
        let request = request.clone();

        block_on_current(async move {
            client
                .create_case()
                .subject(request.subject)
                .communication_body(request.communication_body)
                .service_code(request.service_code)
                .category_code(request.category_code)
                .severity_code(request.severity_code)
                .set_cc_email_addresses(Some(request.cc_email_addresses))
                .send()
                .await
                .map(|output| output.case_id().unwrap_or_default().to_string())
                .map_err(|error| {
                    format!(
                        "failed to create support case: {}",
                        aws_sdk_support::error::DisplayErrorContext(&error)
                    )
                })
        })
    }
}
