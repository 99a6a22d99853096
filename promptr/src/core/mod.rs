//! Pure, deterministic pipeline logic.
//!
//! Everything under `core` is free of I/O: extraction and validation operate
//! on strings and paths only, so the whole response-to-batch pipeline is
//! testable without touching a file system.

pub mod extract;
pub mod operation;
pub mod path;
pub mod validate;
