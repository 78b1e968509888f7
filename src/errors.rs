use crate::a2a::JsonRpcError;

/// Main error type for the content agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    // === Validation Errors ===
    #[error("Incompatible output modes: requested {requested:?}")]
    IncompatibleOutputModes { requested: Vec<String> },

    #[error("Invalid parameters: {reason}")]
    InvalidParams { reason: String },

    // === Task Management Errors ===
    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: String },

    // === Push Notification Errors ===
    #[error("Push notification URL could not be verified: {url}")]
    PushVerificationFailed { url: String },

    // === Generation Errors ===
    #[error("Content generation failed: {reason}")]
    GenerationFailed { reason: String },

    // === Network/IO Errors ===
    #[error("Network error: {operation}: {reason}")]
    Network { operation: String, reason: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    // === General System Errors ===
    #[error("Internal error: {component}: {reason}")]
    Internal { component: String, reason: String },

    // === Configuration Errors ===
    #[error("Missing configuration: {field}")]
    MissingConfiguration { field: String },
}

impl AgentError {
    /// Map an error to its JSON-RPC envelope representation.
    ///
    /// `TaskNotFound` is a store integrity fault from the client's point of
    /// view, so it surfaces as an internal error rather than a 404-style code.
    pub fn to_jsonrpc(&self) -> JsonRpcError {
        match self {
            Self::IncompatibleOutputModes { .. } => JsonRpcError::incompatible_types(),
            Self::InvalidParams { reason } => JsonRpcError::invalid_params(reason.clone()),
            Self::PushVerificationFailed { .. } => {
                JsonRpcError::invalid_params("Push notification URL is invalid")
            }
            Self::TaskNotFound { .. }
            | Self::GenerationFailed { .. }
            | Self::Network { .. }
            | Self::Serialization { .. }
            | Self::Internal { .. }
            | Self::MissingConfiguration { .. } => JsonRpcError::internal_error(self.to_string()),
        }
    }

    /// Get error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::IncompatibleOutputModes { .. } | Self::InvalidParams { .. } => "validation",
            Self::TaskNotFound { .. } => "task",
            Self::PushVerificationFailed { .. } => "notification",
            Self::GenerationFailed { .. } => "generation",
            Self::Network { .. } | Self::Serialization { .. } => "io",
            Self::Internal { .. } => "system",
            Self::MissingConfiguration { .. } => "config",
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(error: serde_json::Error) -> Self {
        AgentError::Serialization {
            reason: error.to_string(),
        }
    }
}

/// Convenience type alias
pub type AgentResult<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2a::{ERROR_CODE_INCOMPATIBLE_TYPES, ERROR_CODE_INTERNAL, ERROR_CODE_INVALID_PARAMS};

    #[test]
    fn validation_errors_map_to_protocol_codes() {
        let incompatible = AgentError::IncompatibleOutputModes {
            requested: vec!["video/mp4".to_string()],
        };
        assert_eq!(incompatible.to_jsonrpc().code, ERROR_CODE_INCOMPATIBLE_TYPES);

        let invalid = AgentError::InvalidParams {
            reason: "Push notification URL is missing".to_string(),
        };
        assert_eq!(invalid.to_jsonrpc().code, ERROR_CODE_INVALID_PARAMS);
    }

    #[test]
    fn store_integrity_faults_surface_as_internal() {
        let not_found = AgentError::TaskNotFound {
            task_id: "missing".to_string(),
        };
        assert_eq!(not_found.to_jsonrpc().code, ERROR_CODE_INTERNAL);
    }
}
