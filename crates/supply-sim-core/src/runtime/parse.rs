// crates/supply-sim-core/src/runtime/parse.rs
// ============================================================================
// Module: Supply Sim Answer Parsing
// Description: Best-effort extraction of assessments from collaborator answers.
// Purpose: Turn raw JSON or prose into a list of assessments, or fail.
// Dependencies: crate::core, crate::interfaces, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Accepted shapes: a JSON array of assessments, an object with an
//! `assessments` array, or text containing such an array (Markdown fences and
//! surrounding prose are ignored). Anything else is discarded as malformed.
//! No semantic validation happens here; unknown stages and choices surface
//! when the assessments are applied.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::Assessment;
use crate::interfaces::RawAssessment;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Answer parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No JSON array could be located in a text answer.
    #[error("answer contains no json array")]
    NoJson,
    /// The located JSON is not syntactically valid.
    #[error("answer json malformed: {0}")]
    Malformed(String),
    /// The JSON does not have the assessment shape.
    #[error("answer has unexpected shape: {0}")]
    UnexpectedShape(String),
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a raw collaborator answer into assessments.
///
/// # Errors
///
/// Returns [`ParseError`] when no assessment array can be extracted.
pub fn parse_assessments(raw: &RawAssessment) -> Result<Vec<Assessment>, ParseError> {
    match raw {
        RawAssessment::Json(value) => parse_value(value),
        RawAssessment::Text(text) => parse_text(text),
    }
}

/// Parses a JSON value into assessments.
fn parse_value(value: &Value) -> Result<Vec<Assessment>, ParseError> {
    match value {
        Value::Array(_) => serde_json::from_value(value.clone())
            .map_err(|err| ParseError::UnexpectedShape(err.to_string())),
        Value::Object(map) => match map.get("assessments") {
            Some(inner @ Value::Array(_)) => parse_value(inner),
            _ => Err(ParseError::UnexpectedShape("object without assessments array".to_string())),
        },
        Value::String(text) => parse_text(text),
        _ => Err(ParseError::UnexpectedShape("expected a json array".to_string())),
    }
}

/// Parses the first embedded JSON array in text that has the assessment shape.
///
/// Brackets in surrounding prose are skipped. When no candidate decodes the
/// first decode error is reported; when candidates decode but none has the
/// assessment shape the first shape error is reported.
fn parse_text(text: &str) -> Result<Vec<Assessment>, ParseError> {
    let mut decode_error = None;
    let mut shape_error = None;
    for start in text.match_indices('[').map(|(start, _)| start) {
        match decode_array_at(text, start) {
            Ok(Some((_, value))) => match parse_value(&value) {
                Ok(assessments) => return Ok(assessments),
                Err(err) => {
                    shape_error.get_or_insert(err);
                }
            },
            Ok(None) => {}
            Err(err) => {
                decode_error.get_or_insert(err);
            }
        }
    }
    Err(shape_error.or(decode_error).unwrap_or(ParseError::NoJson))
}

/// Decodes one JSON value starting at `start` and keeps it only if it is an array.
fn decode_array_at(text: &str, start: usize) -> Result<Option<(&str, Value)>, ParseError> {
    let Some(rest) = text.get(start..) else {
        return Ok(None);
    };
    let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value @ Value::Array(_))) => {
            Ok(rest.get(..stream.byte_offset()).map(|slice| (slice, value)))
        }
        Some(Ok(_)) | None => Ok(None),
        Some(Err(err)) => Err(ParseError::Malformed(err.to_string())),
    }
}

/// Returns the first complete JSON array embedded in text, if any.
///
/// Each `[` is tried in order; a candidate that does not decode as a JSON
/// array (such as a bracketed prose aside) is skipped.
#[must_use]
pub fn extract_json_array(text: &str) -> Option<&str> {
    text.match_indices('[')
        .find_map(|(start, _)| decode_array_at(text, start).ok().flatten())
        .map(|(slice, _)| slice)
}
