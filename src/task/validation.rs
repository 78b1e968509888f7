//! Pure request validation, safe to call repeatedly.

use crate::a2a::{Part, TaskSendParams};
use crate::errors::{AgentError, AgentResult};

/// Output modes this agent can produce.
pub const SUPPORTED_OUTPUT_MODES: &[&str] = &["text", "text/plain", "image/png", "application/json"];

/// Check whether the client's accepted output modes overlap ours.
///
/// An empty accepted set means the client takes anything.
pub fn are_modalities_compatible(accepted: &[String], supported: &[&str]) -> bool {
    if accepted.is_empty() {
        return true;
    }
    accepted.iter().any(|mode| supported.contains(&mode.as_str()))
}

/// Validate an incoming send/sendSubscribe request.
pub fn validate_request(params: &TaskSendParams) -> AgentResult<()> {
    if !are_modalities_compatible(&params.accepted_output_modes, SUPPORTED_OUTPUT_MODES) {
        tracing::warn!(
            requested = ?params.accepted_output_modes,
            supported = ?SUPPORTED_OUTPUT_MODES,
            "Unsupported output mode"
        );
        return Err(AgentError::IncompatibleOutputModes {
            requested: params.accepted_output_modes.clone(),
        });
    }

    if let Some(push) = &params.push_notification {
        if push.url.is_empty() {
            tracing::warn!(task_id = %params.id, "Push notification URL is missing");
            return Err(AgentError::InvalidParams {
                reason: "Push notification URL is missing".to_string(),
            });
        }
    }

    Ok(())
}

/// Extract the user query from the request message.
///
/// The first part must be text; anything else is rejected before any task
/// state is touched.
pub fn user_query(params: &TaskSendParams) -> AgentResult<String> {
    match params.message.parts.first() {
        Some(Part::Text { text, .. }) => Ok(text.clone()),
        _ => Err(AgentError::InvalidParams {
            reason: "Only text parts are supported".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2a::{FileContent, Message, MessageRole, PushNotificationConfig};

    fn params_with_modes(modes: &[&str]) -> TaskSendParams {
        TaskSendParams {
            id: "t1".to_string(),
            message: Message::user_text("hello"),
            accepted_output_modes: modes.iter().map(|m| m.to_string()).collect(),
            history_length: None,
            push_notification: None,
        }
    }

    #[test]
    fn disjoint_modes_are_rejected() {
        let params = params_with_modes(&["video/mp4", "audio/ogg"]);
        assert!(matches!(
            validate_request(&params),
            Err(AgentError::IncompatibleOutputModes { .. })
        ));
    }

    #[test]
    fn overlapping_modes_pass() {
        let params = params_with_modes(&["video/mp4", "image/png"]);
        assert!(validate_request(&params).is_ok());
    }

    #[test]
    fn unspecified_modes_pass() {
        let params = params_with_modes(&[]);
        assert!(validate_request(&params).is_ok());
    }

    #[test]
    fn empty_push_url_is_invalid() {
        let mut params = params_with_modes(&["text"]);
        params.push_notification = Some(PushNotificationConfig {
            url: String::new(),
            token: None,
        });
        assert!(matches!(
            validate_request(&params),
            Err(AgentError::InvalidParams { .. })
        ));
    }

    #[test]
    fn query_requires_leading_text_part() {
        let mut params = params_with_modes(&["text"]);
        assert_eq!(user_query(&params).unwrap(), "hello");

        params.message = Message {
            role: MessageRole::User,
            parts: vec![Part::File {
                file: FileContent {
                    name: None,
                    mime_type: None,
                    bytes: None,
                },
                metadata: None,
            }],
        };
        assert!(matches!(
            user_query(&params),
            Err(AgentError::InvalidParams { .. })
        ));
    }
}
