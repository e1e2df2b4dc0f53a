// todolist - Personal to-do list on a single-table SQLite store

pub mod board;
pub mod config;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use board::Board;
pub use config::{Config, WriteFailurePolicy};
pub use store::TaskStore;
pub use task::{Partitions, Status, Task, today};

// Re-export rusqlite for callers that bring their own connection
pub use rusqlite;
