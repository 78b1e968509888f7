//! Asynchronous task lifecycle manager for an A2A content creation agent.
//!
//! Accepts "generate social content" requests, tracks each task through an
//! explicit state machine, streams progress events to subscribers, assembles
//! generation results into ordered artifacts, and delivers signed webhook
//! notifications on state changes. The content/image generation pipeline
//! itself is injected through the [`agent::ContentGenerator`] capability.

pub mod a2a;
pub mod agent;
pub mod assembler;
pub mod config;
pub mod errors;
pub mod events;
pub mod notifications;
pub mod task;

// Re-export key task management types for easier access
pub use task::{ContentTaskManager, InMemoryTaskStore, TaskStore};

// Re-export key error types for easier access
pub use errors::{AgentError, AgentResult};
