//! Bridge between the prompt and the backend worker thread.

pub mod commands;
pub mod runtime;
