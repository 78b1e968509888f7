//! Task lifecycle management.
//!
//! - `TaskStore`: persistence abstraction with per-task atomic updates
//! - `InMemoryTaskStore`: per-task-locking in-memory implementation
//! - `validation`: pure request checks shared by both send variants
//! - `ContentTaskManager`: the lifecycle controller orchestrating store,
//!   generator, event broker, and push notifications

pub mod in_memory_task_store;
pub mod task_manager;
pub mod task_store;
pub mod validation;

pub use in_memory_task_store::InMemoryTaskStore;
pub use task_manager::ContentTaskManager;
pub use task_store::TaskStore;
pub use validation::SUPPORTED_OUTPUT_MODES;
