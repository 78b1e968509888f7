use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::task_store::TaskStore;
use super::validation::{user_query, validate_request};
use crate::a2a::{
    JsonRpcError, Message, SendTaskRequest, SendTaskResponse, SendTaskStreamingRequest, Task,
    TaskArtifactUpdateEvent, TaskResubscriptionRequest, TaskSendParams, TaskState, TaskStatus,
    TaskStatusUpdateEvent, TaskUpdateEvent,
};
use crate::agent::ContentGenerator;
use crate::assembler::assemble;
use crate::errors::{AgentError, AgentResult};
use crate::events::{EventBroker, TaskEventStream};
use crate::notifications::PushNotificationSender;

/// Orchestrates the content creation task lifecycle.
///
/// Validates requests, drives task state through
/// `Submitted -> Working -> {Completed | Failed | Error}`, invokes the
/// injected generator, and fans out progress as events and push
/// notifications. `Failed` is the terminal failure state on the synchronous
/// path; `Error` on the streaming path. Both mean the generator produced no
/// usable result.
pub struct ContentTaskManager {
    store: Arc<dyn TaskStore>,
    generator: Arc<dyn ContentGenerator>,
    broker: Arc<EventBroker>,
    push_sender: Option<Arc<PushNotificationSender>>,
}

impl ContentTaskManager {
    pub fn new(store: Arc<dyn TaskStore>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            store,
            generator,
            broker: Arc::new(EventBroker::new()),
            push_sender: None,
        }
    }

    /// Enable signed push notifications for state changes.
    pub fn with_push_sender(mut self, push_sender: Arc<PushNotificationSender>) -> Self {
        self.push_sender = Some(push_sender);
        self
    }

    /// Handle a blocking send request: run the full lifecycle and answer with
    /// the terminal task record.
    pub async fn on_send_task(&self, request: SendTaskRequest) -> SendTaskResponse {
        let SendTaskRequest { id, params } = request;

        let query = match self.admit(&params).await {
            Ok(query) => query,
            Err(error) => return SendTaskResponse::error(id, error.to_jsonrpc()),
        };

        match self.execute_send(&params, &query).await {
            Ok(task) => SendTaskResponse::ok(id, task),
            Err(error) => {
                tracing::error!(
                    task_id = %params.id,
                    category = error.category(),
                    "Send task failed: {error}"
                );
                SendTaskResponse::error(id, error.to_jsonrpc())
            }
        }
    }

    /// Handle a streaming send request: admit the task, schedule the
    /// generation worker, and immediately hand back a live event stream.
    pub async fn on_send_task_subscribe(
        &self,
        request: SendTaskStreamingRequest,
    ) -> Result<TaskEventStream, JsonRpcError> {
        let SendTaskStreamingRequest { id, params } = request;

        let query = self.admit(&params).await.map_err(|e| e.to_jsonrpc())?;
        self.store
            .upsert(&params)
            .await
            .map_err(|e| e.to_jsonrpc())?;

        let receiver = self
            .broker
            .open(&params.id, false)
            .await
            .map_err(|e| e.to_jsonrpc())?;

        self.spawn_streaming_worker(params, query, CancellationToken::new());

        Ok(TaskEventStream::new(id, receiver))
    }

    /// Re-open an event stream for an existing task without re-running the
    /// generator. A task that already reached a terminal state yields exactly
    /// one final status event built from the stored record; the broker itself
    /// replays nothing.
    pub async fn on_resubscribe(
        &self,
        request: TaskResubscriptionRequest,
    ) -> Result<TaskEventStream, JsonRpcError> {
        let task_id = request.params.id;

        let task = self
            .store
            .get(&task_id)
            .await
            .map_err(|e| e.to_jsonrpc())?
            .ok_or_else(|| JsonRpcError::internal_error("Task not found for resubscription"))?;

        let receiver = self
            .broker
            .open(&task_id, true)
            .await
            .map_err(|e| e.to_jsonrpc())?;
        let stream = TaskEventStream::new(request.id, receiver);

        // The worker may have published its final event between the read and
        // the attach, leaving the new subscriber on a channel nothing will
        // write to again. The store is updated before every publish, so a
        // second read decides from post-attach state; a duplicate publish is
        // harmless because the stream stops at the first final event.
        let terminal = if task.status.state.is_terminal() {
            Some(task)
        } else {
            self.store
                .get(&task_id)
                .await
                .map_err(|e| e.to_jsonrpc())?
                .filter(|current| current.status.state.is_terminal())
        };

        if let Some(task) = terminal {
            self.broker
                .publish(
                    &task_id,
                    TaskUpdateEvent::Status(TaskStatusUpdateEvent {
                        id: task_id.clone(),
                        status: task.status,
                        is_final: true,
                    }),
                )
                .await
                .map_err(|e| e.to_jsonrpc())?;
        }

        Ok(stream)
    }

    /// Steps shared by both send variants, all before any task mutation:
    /// validation, query extraction, and push config registration.
    async fn admit(&self, params: &TaskSendParams) -> AgentResult<String> {
        validate_request(params)?;
        let query = user_query(params)?;

        if let Some(config) = &params.push_notification {
            match &self.push_sender {
                Some(sender) => {
                    if !sender.register(&params.id, config.clone()).await {
                        return Err(AgentError::PushVerificationFailed {
                            url: config.url.clone(),
                        });
                    }
                }
                None => {
                    tracing::warn!(
                        task_id = %params.id,
                        "Push notifications disabled; ignoring requested config"
                    );
                }
            }
        }

        Ok(query)
    }

    async fn execute_send(&self, params: &TaskSendParams, query: &str) -> AgentResult<Task> {
        self.store.upsert(params).await?;
        let task = self
            .store
            .update(&params.id, Some(TaskStatus::new(TaskState::Working)), None)
            .await?;
        self.notify(&task).await;

        tracing::info!(task_id = %params.id, "Invoking content generator");
        let outcome = match self.generator.invoke(query).await {
            Ok(output) => assemble(&output),
            Err(error) => Err(error),
        };

        match outcome {
            Ok((artifacts, summary)) => {
                let status =
                    TaskStatus::with_message(TaskState::Completed, Message::agent_text(summary));
                let task = self
                    .store
                    .update(&params.id, Some(status), Some(artifacts))
                    .await?;
                self.notify(&task).await;
                self.with_trimmed_history(task, params.history_length).await
            }
            Err(error) => {
                tracing::error!(task_id = %params.id, "Content generation failed: {error}");
                let status = TaskStatus::with_message(
                    TaskState::Failed,
                    Message::agent_text(format!("Error creating content: {error}")),
                );
                let task = self.store.update(&params.id, Some(status), None).await?;
                self.notify(&task).await;
                Err(AgentError::GenerationFailed {
                    reason: error.to_string(),
                })
            }
        }
    }

    /// Attach the trimmed history view requested by the client. With no
    /// requested length the history is omitted from the response entirely.
    async fn with_trimmed_history(
        &self,
        mut task: Task,
        history_length: Option<usize>,
    ) -> AgentResult<Task> {
        if let Some(limit) = history_length {
            task.history = Some(self.store.history(&task.id, Some(limit)).await?);
        }
        Ok(task)
    }

    async fn notify(&self, task: &Task) {
        if let Some(sender) = &self.push_sender {
            sender.notify(task).await;
        }
    }

    /// Schedule the streaming generation sequence as an independent unit of
    /// work. The cancellation token is plumbed through for a future cancel
    /// operation; nothing triggers it today.
    fn spawn_streaming_worker(
        &self,
        params: TaskSendParams,
        query: String,
        cancel: CancellationToken,
    ) {
        let worker = StreamingWorker {
            store: Arc::clone(&self.store),
            generator: Arc::clone(&self.generator),
            broker: Arc::clone(&self.broker),
            push_sender: self.push_sender.clone(),
            cancel,
        };

        tokio::spawn(async move {
            if let Err(error) = worker.run(&params, &query).await {
                tracing::error!(
                    task_id = %params.id,
                    category = error.category(),
                    "Streaming content creation failed: {error}"
                );
                worker.fail(&params.id, &error).await;
            }
        });
    }
}

/// The scheduled generation-and-delivery sequence for one streaming request.
///
/// Every event is published only after its store mutation has been applied.
struct StreamingWorker {
    store: Arc<dyn TaskStore>,
    generator: Arc<dyn ContentGenerator>,
    broker: Arc<EventBroker>,
    push_sender: Option<Arc<PushNotificationSender>>,
    cancel: CancellationToken,
}

impl StreamingWorker {
    async fn run(&self, params: &TaskSendParams, query: &str) -> AgentResult<()> {
        self.advance(
            &params.id,
            TaskState::Working,
            "Starting content creation process...",
            false,
        )
        .await?;

        self.advance(
            &params.id,
            TaskState::Working,
            "Creating content package and generating image...",
            false,
        )
        .await?;

        tracing::info!(task_id = %params.id, "Invoking content generator");
        let output = tokio::select! {
            _ = self.cancel.cancelled() => {
                return Err(AgentError::GenerationFailed {
                    reason: "content generation canceled".to_string(),
                });
            }
            result = self.generator.invoke(query) => result?,
        };

        let (artifacts, summary) = assemble(&output)?;
        for artifact in artifacts {
            self.store
                .update(&params.id, None, Some(vec![artifact.clone()]))
                .await?;
            self.broker
                .publish(
                    &params.id,
                    TaskUpdateEvent::Artifact(TaskArtifactUpdateEvent {
                        id: params.id.clone(),
                        artifact,
                    }),
                )
                .await?;
        }

        self.advance(&params.id, TaskState::Completed, &summary, true)
            .await?;

        Ok(())
    }

    /// Apply a status update to the store, notify, then publish the event.
    async fn advance(
        &self,
        task_id: &str,
        state: TaskState,
        text: &str,
        is_final: bool,
    ) -> AgentResult<()> {
        let status = TaskStatus::with_message(state, Message::agent_text(text));
        let task = self
            .store
            .update(task_id, Some(status.clone()), None)
            .await?;
        self.notify(&task).await;

        self.broker
            .publish(
                task_id,
                TaskUpdateEvent::Status(TaskStatusUpdateEvent {
                    id: task_id.to_string(),
                    status,
                    is_final,
                }),
            )
            .await
    }

    /// Drive the task to its terminal Error state and emit the final event.
    ///
    /// The final event goes out even if the store update itself fails, so a
    /// consumer always sees its stream terminate.
    async fn fail(&self, task_id: &str, error: &AgentError) {
        let status = TaskStatus::with_message(
            TaskState::Error,
            Message::agent_text(format!("Error creating content: {error}")),
        );

        match self
            .store
            .update(task_id, Some(status.clone()), None)
            .await
        {
            Ok(task) => self.notify(&task).await,
            Err(store_error) => {
                tracing::error!(task_id = %task_id, "Failed to record error state: {store_error}");
            }
        }

        if let Err(publish_error) = self
            .broker
            .publish(
                task_id,
                TaskUpdateEvent::Status(TaskStatusUpdateEvent {
                    id: task_id.to_string(),
                    status,
                    is_final: true,
                }),
            )
            .await
        {
            tracing::error!(task_id = %task_id, "Failed to publish final error event: {publish_error}");
        }
    }

    async fn notify(&self, task: &Task) {
        if let Some(sender) = &self.push_sender {
            sender.notify(task).await;
        }
    }
}
