/// A required configuration value was absent. Never defaulted for identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .names.join(", "))]
    MissingEnvironment { names: Vec<&'static str> },
    #[error("Missing required resource property: {name}")]
    MissingProperty { name: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Mutation(String),
}

impl HandlerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn mutation(message: impl Into<String>) -> Self {
        Self::Mutation(message.into())
    }

    /// Status code used on the direct-invocation path.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration(_) | Self::Validation(_) => 400,
            Self::Mutation(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::Validation(_) => "validation_error",
            Self::Mutation(_) => "mutation_failed",
        }
    }
}
