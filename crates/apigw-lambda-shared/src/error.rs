use thiserror::Error;

/// Convenient result alias for deployment operations.
pub type Result<T> = std::result::Result<T, DeployError>;

/// Errors raised while handling a custom-resource lifecycle event.
#[derive(Debug, Error)]
pub enum DeployError {
    /// A required resource property was absent.
    #[error("\"API_ID\" and \"API_STAGE\" is required: missing {name}")]
    MissingProperty { name: &'static str },

    /// A resource property was present but not a string.
    #[error("\"API_ID\" and \"API_STAGE\" is required: {name} must be a string, found {found}")]
    InvalidProperty {
        name: &'static str,
        found: &'static str,
    },

    /// The resource properties were not a JSON object.
    #[error("\"API_ID\" and \"API_STAGE\" is required: resource properties must be an object, found {found}")]
    InvalidProperties { found: &'static str },

    /// A resource property was a blank string.
    #[error("\"API_ID\" and \"API_STAGE\" is required: {name} cannot be empty")]
    EmptyProperty { name: &'static str },

    /// The remote API management service rejected or failed a call.
    #[error("{operation} failed: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    /// The create-deployment call succeeded without assigning an id.
    #[error("create deployment returned no deployment id")]
    MissingDeploymentId,

    /// The invocation payload was not a custom-resource event.
    #[error("invalid custom resource event: {0}")]
    InvalidEvent(#[from] serde_json::Error),
}

impl DeployError {
    /// Construct a remote failure for the named operation.
    pub fn remote(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Remote {
            operation,
            message: message.into(),
        }
    }

    /// Whether the error was raised by property validation, before any remote call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingProperty { .. }
                | Self::InvalidProperty { .. }
                | Self::InvalidProperties { .. }
                | Self::EmptyProperty { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        assert!(DeployError::MissingProperty { name: "API_ID" }.is_validation());
        assert!(DeployError::EmptyProperty { name: "API_STAGE" }.is_validation());
        assert!(DeployError::InvalidProperties { found: "null" }.is_validation());
        assert!(!DeployError::MissingDeploymentId.is_validation());
        assert!(!DeployError::remote("UpdateStage", "throttled").is_validation());
    }

    #[test]
    fn remote_error_keeps_raw_message() {
        let err = DeployError::remote("CreateDeployment", "AccessDeniedException: nope");
        assert_eq!(
            err.to_string(),
            "CreateDeployment failed: AccessDeniedException: nope"
        );
    }
}
