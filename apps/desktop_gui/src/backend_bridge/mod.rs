//! Backend worker: command types and the thread that owns the tokio runtime.

pub mod commands;
pub mod runtime;
