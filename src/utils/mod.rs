//! Utility modules shared by the runner.

pub mod exec;
pub mod path;
