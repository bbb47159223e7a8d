//! Worker side: takes lookup commands off the queue and reports completions.

pub mod commands;
pub mod runtime;
