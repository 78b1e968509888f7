use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::task_store::TaskStore;
use crate::a2a::{Artifact, Message, Task, TaskSendParams, TaskState, TaskStatus};
use crate::errors::{AgentError, AgentResult};

/// A task record together with its append-only message log.
struct TaskEntry {
    task: Task,
    history: Vec<Message>,
}

/// In-memory implementation of `TaskStore`.
///
/// Uses per-task locking: the outer map is only held long enough to resolve a
/// task id to its dedicated lock, so updates to unrelated tasks never contend.
/// Entry locks are created with the task and live for the process lifetime.
pub struct InMemoryTaskStore {
    entries: RwLock<HashMap<String, Arc<Mutex<TaskEntry>>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn entry(&self, task_id: &str) -> AgentResult<Arc<Mutex<TaskEntry>>> {
        let entries = self.entries.read().await;
        entries
            .get(task_id)
            .cloned()
            .ok_or_else(|| AgentError::TaskNotFound {
                task_id: task_id.to_string(),
            })
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn upsert(&self, params: &TaskSendParams) -> AgentResult<Task> {
        let mut entries = self.entries.write().await;

        if let Some(existing) = entries.get(&params.id) {
            let entry = existing.clone();
            drop(entries);
            let entry = entry.lock().await;
            return Ok(entry.task.clone());
        }

        tracing::info!(task_id = %params.id, "Creating new task");
        let task = Task {
            id: params.id.clone(),
            status: TaskStatus::new(TaskState::Submitted),
            artifacts: Vec::new(),
            history: None,
        };
        entries.insert(
            params.id.clone(),
            Arc::new(Mutex::new(TaskEntry {
                task: task.clone(),
                history: vec![params.message.clone()],
            })),
        );

        Ok(task)
    }

    async fn update(
        &self,
        task_id: &str,
        status: Option<TaskStatus>,
        artifacts: Option<Vec<Artifact>>,
    ) -> AgentResult<Task> {
        let entry = self.entry(task_id).await?;
        let mut entry = entry.lock().await;

        if let Some(status) = status {
            if let Some(message) = &status.message {
                entry.history.push(message.clone());
            }
            entry.task.status = status;
        }

        if let Some(artifacts) = artifacts {
            entry.task.artifacts.extend(artifacts);
        }

        Ok(entry.task.clone())
    }

    async fn get(&self, task_id: &str) -> AgentResult<Option<Task>> {
        let entry = {
            let entries = self.entries.read().await;
            entries.get(task_id).cloned()
        };

        match entry {
            Some(entry) => {
                let entry = entry.lock().await;
                Ok(Some(entry.task.clone()))
            }
            None => Ok(None),
        }
    }

    async fn history(&self, task_id: &str, limit: Option<usize>) -> AgentResult<Vec<Message>> {
        let entry = self.entry(task_id).await?;
        let entry = entry.lock().await;

        let messages = match limit {
            Some(limit) => {
                let skip = entry.history.len().saturating_sub(limit);
                entry.history[skip..].to_vec()
            }
            None => entry.history.clone(),
        };

        Ok(messages)
    }
}
