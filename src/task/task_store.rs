use async_trait::async_trait;

use crate::a2a::{Artifact, Message, Task, TaskSendParams, TaskStatus};
use crate::errors::AgentResult;

/// Abstraction for task persistence.
///
/// The store owns every task record after creation; all mutation goes through
/// `update`, which is atomic per task id. Alongside each task the store keeps
/// an append-only message log, created with the task and never materialized
/// anywhere else.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Create the task if the id is absent, otherwise return the existing
    /// record unchanged. Idempotent.
    ///
    /// New tasks start in `Submitted` state with no artifacts; the incoming
    /// user message seeds the history log.
    async fn upsert(&self, params: &TaskSendParams) -> AgentResult<Task>;

    /// Apply a status change and/or append artifacts to an existing task.
    ///
    /// Fails with `TaskNotFound` on an unknown id — it never creates a task.
    /// A status message, when present, is appended to the history log.
    /// Atomic with respect to concurrent callers on the same id.
    async fn update(
        &self,
        task_id: &str,
        status: Option<TaskStatus>,
        artifacts: Option<Vec<Artifact>>,
    ) -> AgentResult<Task>;

    /// Retrieve a task by id. Returns None if the task doesn't exist.
    async fn get(&self, task_id: &str) -> AgentResult<Option<Task>>;

    /// Return the most recent `limit` messages (all if None), oldest first.
    async fn history(&self, task_id: &str, limit: Option<usize>) -> AgentResult<Vec<Message>>;
}
