//! Operation extraction from free-form model output.
//!
//! Model output is untyped text with one machine-readable payload embedded
//! somewhere inside it, usually wrapped in a markdown code fence and often
//! surrounded by prose. Extraction is a tolerant two-stage parse: locate the
//! payload substring first, then strict-decode that substring. Location is
//! forgiving; decoding is not (missing or mistyped fields reject the payload,
//! nothing is coerced).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::core::operation::OperationBatch;

const BATCH_SCHEMA: &str = include_str!("../../schemas/operations.schema.json");

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?[ \t]*\n(.*?)```").expect("fence pattern should be valid")
});

static SCHEMA: LazyLock<jsonschema::Validator> = LazyLock::new(|| {
    let schema: Value =
        serde_json::from_str(BATCH_SCHEMA).expect("embedded batch schema should be valid json");
    jsonschema::options()
        .with_draft(jsonschema::Draft::Draft202012)
        .build(&schema)
        .expect("embedded batch schema should compile")
});

/// Why a model response produced no usable batch.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No code fence or top-level JSON object could be located in the text.
    #[error("no operations payload found in model output")]
    NoPayload,
    /// A payload was located but fails to parse as the expected shape.
    #[error("malformed operations payload: {0}")]
    Malformed(String),
}

/// Extract the operation batch embedded in raw model output.
///
/// Prefers the first fenced code block whose body is a JSON object; falls
/// back to the first brace-balanced object literal anywhere in the text.
/// Operation order is preserved exactly as emitted. An empty `operations`
/// list is a valid no-op batch, not an error.
pub fn extract_operations(raw: &str) -> Result<OperationBatch, ExtractError> {
    let payload = locate_payload(raw).ok_or(ExtractError::NoPayload)?;
    decode_batch(payload)
}

/// Strict-decode a payload substring into a batch.
///
/// Also the entry point for piped direct-apply input, which skips location.
/// The payload must parse as JSON, conform to the embedded batch schema, and
/// decode into [`OperationBatch`]. Leading/trailing whitespace is tolerated.
pub fn decode_batch(payload: &str) -> Result<OperationBatch, ExtractError> {
    let value: Value = serde_json::from_str(payload.trim())
        .map_err(|err| ExtractError::Malformed(err.to_string()))?;
    let violations: Vec<String> = SCHEMA.iter_errors(&value).map(|err| err.to_string()).collect();
    if !violations.is_empty() {
        return Err(ExtractError::Malformed(violations.join("; ")));
    }
    serde_json::from_value(value).map_err(|err| ExtractError::Malformed(err.to_string()))
}

/// Locate the payload substring inside raw model output.
fn locate_payload(raw: &str) -> Option<&str> {
    for caps in FENCE_RE.captures_iter(raw) {
        let body = caps.get(1).expect("fence capture").as_str().trim();
        if body.starts_with('{') {
            return Some(body);
        }
    }
    first_object_literal(raw)
}

/// Return the first brace-balanced top-level JSON object in `text`.
///
/// Walks bytes with string/escape awareness so braces inside string values
/// do not confuse the depth count.
fn first_object_literal(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| b == b'{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
