//! State module for tracking fetch task progress
//!
//! # Components
//!
//! - `TaskState`: the lifecycle of a single fetch task
//!   (queued, in flight, completed, failed, discarded)

mod task_state;

// Re-export main types
pub use task_state::TaskState;
