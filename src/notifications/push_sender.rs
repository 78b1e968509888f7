use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::a2a::{PushNotificationConfig, Task};
use crate::errors::{AgentError, AgentResult};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC-SHA256 signature of the notification body.
pub const SIGNATURE_HEADER: &str = "X-Push-Signature";
/// Header echoing the client-supplied opaque token, when one was registered.
pub const TOKEN_HEADER: &str = "X-Push-Token";
/// Query parameter used for the ownership challenge.
pub const VALIDATION_TOKEN_PARAM: &str = "validationToken";

/// Verifies callback URLs and delivers signed task snapshots.
///
/// A config is stored only after its URL passes challenge verification, so
/// `notify` never posts to an unproven endpoint. Delivery is best-effort:
/// failures are logged and never surface to the task lifecycle.
pub struct PushNotificationSender {
    client: reqwest::Client,
    secret: String,
    configs: RwLock<HashMap<String, PushNotificationConfig>>,
}

impl PushNotificationSender {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret: secret.into(),
            configs: RwLock::new(HashMap::new()),
        }
    }

    /// Prove control of a callback URL via a random-token challenge.
    ///
    /// The endpoint must echo the exact token back in its response body.
    pub async fn verify_url(&self, url: &str) -> bool {
        let token = Uuid::new_v4().simple().to_string();

        let response = self
            .client
            .get(url)
            .query(&[(VALIDATION_TOKEN_PARAM, token.as_str())])
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => {
                    let verified = body.trim() == token;
                    if !verified {
                        tracing::warn!(url = %url, "Challenge token mismatch");
                    }
                    verified
                }
                Err(error) => {
                    tracing::warn!(url = %url, "Failed to read challenge response: {error}");
                    false
                }
            },
            Ok(response) => {
                tracing::warn!(url = %url, status = %response.status(), "Challenge request rejected");
                false
            }
            Err(error) => {
                tracing::warn!(url = %url, "Challenge request failed: {error}");
                false
            }
        }
    }

    /// Register a push config for a task, after verifying its URL.
    ///
    /// Returns false (and stores nothing) if verification fails. Re-registering
    /// an id replaces the previous config, again only after verification.
    pub async fn register(&self, task_id: &str, config: PushNotificationConfig) -> bool {
        if !self.verify_url(&config.url).await {
            return false;
        }

        tracing::info!(task_id = %task_id, url = %config.url, "Registered push notification config");
        let mut configs = self.configs.write().await;
        configs.insert(task_id.to_string(), config);
        true
    }

    /// Whether a verified config exists for the task id.
    pub async fn has_config(&self, task_id: &str) -> bool {
        let configs = self.configs.read().await;
        configs.contains_key(task_id)
    }

    /// Deliver a signed snapshot of the task to its registered URL.
    ///
    /// No-op when no config is registered. Failures are logged only; the
    /// enclosing lifecycle operation must never observe them. The terminal
    /// snapshot is the last delivery for a task, so its config is dropped
    /// afterwards.
    pub async fn notify(&self, task: &Task) {
        let config = {
            let configs = self.configs.read().await;
            configs.get(&task.id).cloned()
        };

        let Some(config) = config else {
            tracing::debug!(task_id = %task.id, "No push notification config for task");
            return;
        };

        if let Err(error) = self.deliver(task, &config).await {
            tracing::warn!(
                task_id = %task.id,
                url = %config.url,
                "Push notification delivery failed: {error}"
            );
        }

        if task.status.state.is_terminal() {
            let mut configs = self.configs.write().await;
            configs.remove(&task.id);
        }
    }

    async fn deliver(&self, task: &Task, config: &PushNotificationConfig) -> AgentResult<()> {
        let payload = serde_json::to_vec(task)?;
        let signature = self.sign(&payload);

        tracing::info!(task_id = %task.id, state = ?task.status.state, "Notifying push endpoint");

        let mut request = self
            .client
            .post(&config.url)
            .header("Content-Type", "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(payload);

        if let Some(token) = &config.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request.send().await.map_err(|error| AgentError::Network {
            operation: "push_notification".to_string(),
            reason: error.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(AgentError::Network {
                operation: "push_notification".to_string(),
                reason: format!("endpoint returned {}", response.status()),
            });
        }

        Ok(())
    }

    fn sign(&self, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Recompute and compare the signature for a received notification body.
/// Intended for receiver-side verification in tests and downstream consumers.
pub fn verify_signature(secret: &str, payload: &[u8], signature_hex: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);
    match hex::decode(signature_hex) {
        Ok(signature) => mac.verify_slice(&signature).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2a::{TaskState, TaskStatus};

    #[test]
    fn signature_round_trip() {
        let sender = PushNotificationSender::new("secret-key");
        let payload = br#"{"id":"t1"}"#;
        let signature = sender.sign(payload);

        assert!(verify_signature("secret-key", payload, &signature));
        assert!(!verify_signature("other-key", payload, &signature));
        assert!(!verify_signature("secret-key", b"tampered", &signature));
    }

    #[tokio::test]
    async fn notify_without_config_is_a_noop() {
        let sender = PushNotificationSender::new("secret-key");
        let task = Task {
            id: "t1".to_string(),
            status: TaskStatus::new(TaskState::Working),
            artifacts: Vec::new(),
            history: None,
        };

        // No config registered: must return without any network activity.
        sender.notify(&task).await;
        assert!(!sender.has_config("t1").await);
    }
}
