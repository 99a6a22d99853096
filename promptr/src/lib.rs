//! Prompt-driven refactoring assistant.
//!
//! promptr sends a user prompt (plus file context) to a language model and
//! interprets the response as an ordered batch of file operations which it
//! validates and applies. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (payload extraction, structural
//!   validation, path containment). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (file writes, configuration,
//!   the model API call). Isolated to enable scripted doubles in tests.
//!
//! [`run`] coordinates core logic with I/O to implement the CLI's interpret
//! and direct-apply entry modes.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
