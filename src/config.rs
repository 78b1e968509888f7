//! Environment-derived runtime configuration.

use std::sync::Arc;

use crate::errors::{AgentError, AgentResult};
use crate::notifications::PushNotificationSender;

pub const ENABLE_PUSH_NOTIFICATIONS: &str = "ENABLE_PUSH_NOTIFICATIONS";
pub const PUSH_NOTIFICATION_SECRET: &str = "PUSH_NOTIFICATION_SECRET";

/// Runtime configuration for the content agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Signing secret for outbound webhook payloads; None disables push
    /// notifications entirely.
    pub push_notification_secret: Option<String>,
}

impl AgentConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> AgentResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an explicit lookup function. The seam used
    /// by tests and by callers resolving from a secret manager.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AgentResult<Self> {
        let enabled = lookup(ENABLE_PUSH_NOTIFICATIONS)
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if !enabled {
            return Ok(Self {
                push_notification_secret: None,
            });
        }

        let secret = lookup(PUSH_NOTIFICATION_SECRET).ok_or(AgentError::MissingConfiguration {
            field: PUSH_NOTIFICATION_SECRET.to_string(),
        })?;

        Ok(Self {
            push_notification_secret: Some(secret),
        })
    }

    /// Build the push sender this configuration calls for, if any.
    pub fn push_sender(&self) -> Option<Arc<PushNotificationSender>> {
        self.push_notification_secret
            .as_ref()
            .map(|secret| Arc::new(PushNotificationSender::new(secret.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_by_default() {
        let config = AgentConfig::from_lookup(|_| None).unwrap();
        assert!(config.push_notification_secret.is_none());
        assert!(config.push_sender().is_none());
    }

    #[test]
    fn enabled_requires_secret() {
        let result = AgentConfig::from_lookup(|key| match key {
            ENABLE_PUSH_NOTIFICATIONS => Some("true".to_string()),
            _ => None,
        });
        assert!(matches!(
            result,
            Err(AgentError::MissingConfiguration { field }) if field == PUSH_NOTIFICATION_SECRET
        ));
    }

    #[test]
    fn enabled_with_secret_builds_sender() {
        let config = AgentConfig::from_lookup(|key| match key {
            ENABLE_PUSH_NOTIFICATIONS => Some("TRUE".to_string()),
            PUSH_NOTIFICATION_SECRET => Some("hush".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(config.push_sender().is_some());
    }
}
