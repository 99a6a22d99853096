//! Side-effecting operations: file system, configuration, model API.

pub mod apply;
pub mod config;
pub mod context;
pub mod model;
pub mod template;
