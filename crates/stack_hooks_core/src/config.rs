//! Process-wide configuration, resolved once at invocation entry.
//!
//! Every constructor takes a lookup function so tests can supply values
//! without touching the process environment. Blank values count as missing.

use crate::error::ConfigError;

pub const CUR_CRAWLER_NAME: &str = "CUR_CRAWLER_NAME";
pub const SNS_TOPIC_ARN: &str = "SNS_TOPIC_ARN";
pub const TENANT_ID: &str = "TENANT_ID";
pub const EXTERNAL_ID: &str = "EXTERNAL_ID";

pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerConfig {
    pub crawler_name: String,
}

impl CrawlerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup_value(&lookup, CUR_CRAWLER_NAME) {
            Some(crawler_name) => Ok(Self { crawler_name }),
            None => Err(ConfigError::MissingEnvironment {
                names: vec![CUR_CRAWLER_NAME],
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    pub topic_arn: String,
    pub tenant_id: String,
    pub external_id: String,
}

impl PublisherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let topic_arn = lookup_value(&lookup, SNS_TOPIC_ARN);
        let tenant_id = lookup_value(&lookup, TENANT_ID);
        let external_id = lookup_value(&lookup, EXTERNAL_ID);

        match (topic_arn, tenant_id, external_id) {
            (Some(topic_arn), Some(tenant_id), Some(external_id)) => Ok(Self {
                topic_arn,
                tenant_id,
                external_id,
            }),
            (topic_arn, tenant_id, external_id) => {
                let names = [
                    (SNS_TOPIC_ARN, topic_arn.is_none()),
                    (TENANT_ID, tenant_id.is_none()),
                    (EXTERNAL_ID, external_id.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, missing)| missing.then_some(name))
                .collect();
                Err(ConfigError::MissingEnvironment { names })
            }
        }
    }
}

fn lookup_value(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
