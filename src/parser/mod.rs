//! Trace document decoding.
//!
//! Parses raw collector JSON into structured [`TraceDocument`]s.
//! Individual malformed events are salvaged (skipped with a warning), and
//! per-document failures never abort a multi-document batch: partial
//! results are always preferable to losing the whole run.

pub mod schema;

pub use schema::{CallType, TraceDocument, TraceEvent};

use crate::utils::error::ParseError;
use log::{debug, warn};

/// Decode a trace document from a parsed JSON value
///
/// # Arguments
/// * `raw` - Raw JSON value holding `metadata` and `trace_data`
///
/// # Returns
/// Decoded document with events in emission order
///
/// # Errors
/// * `ParseError::MissingTraceData` - No `trace_data` array present
/// * `ParseError::InvalidFormat` - Document is not an object, or every
///   event in a non-empty `trace_data` failed to decode
pub fn parse_document(raw: &serde_json::Value) -> Result<TraceDocument, ParseError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| ParseError::InvalidFormat("trace document must be a JSON object".into()))?;

    let events_value = obj
        .get("trace_data")
        .and_then(|v| v.as_array())
        .ok_or(ParseError::MissingTraceData)?;

    let trace_data = parse_events_array(events_value)?;
    debug!("Decoded {} trace events", trace_data.len());

    Ok(TraceDocument {
        metadata: obj.get("metadata").cloned().unwrap_or(serde_json::Value::Null),
        trace_data,
    })
}

/// Decode a trace document from JSON text
///
/// # Errors
/// * `ParseError::JsonError` - Text is not valid JSON
/// * plus everything [`parse_document`] can return
pub fn parse_document_str(text: &str) -> Result<TraceDocument, ParseError> {
    let raw: serde_json::Value = serde_json::from_str(text)?;
    parse_document(&raw)
}

/// Decode a batch of trace documents, keeping per-document results
///
/// One malformed document must not prevent processing the rest, so each
/// entry carries its own `Result`. Failures are logged as they occur.
pub fn parse_documents(raws: &[serde_json::Value]) -> Vec<Result<TraceDocument, ParseError>> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| {
            let parsed = parse_document(raw);
            if let Err(e) = &parsed {
                warn!("Skipping trace document {}: {}", index, e);
            }
            parsed
        })
        .collect()
}

/// Decode the event array, salvaging malformed entries
fn parse_events_array(events: &[serde_json::Value]) -> Result<Vec<TraceEvent>, ParseError> {
    let mut decoded = Vec::with_capacity(events.len());

    for (index, value) in events.iter().enumerate() {
        match serde_json::from_value::<TraceEvent>(value.clone()) {
            Ok(event) => decoded.push(event),
            Err(e) => {
                // Log but don't fail - the collector occasionally emits
                // truncated records at scope boundaries
                warn!("Failed to decode event {}: {}", index, e);
            }
        }
    }

    if decoded.is_empty() && !events.is_empty() {
        return Err(ParseError::InvalidFormat(
            "all trace events failed to decode".to_string(),
        ));
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_call_type_does_not_fail_document() {
        let doc = parse_document(&json!({
            "metadata": {"original_command": "run.py"},
            "trace_data": [
                {"location": "a.py:1", "name": "main", "call_type": "function_call", "depth": 0},
                {"location": "a.py:2", "name": "odd", "call_type": "quantum_call", "depth": 1}
            ]
        }))
        .unwrap();

        assert_eq!(doc.trace_data.len(), 2);
        assert_eq!(doc.trace_data[1].call_type, CallType::Unknown);
    }

    #[test]
    fn malformed_event_is_salvaged() {
        let doc = parse_document(&json!({
            "trace_data": [
                {"location": "a.py:1", "name": "main", "call_type": "function_call", "depth": 0},
                {"name": "missing location"}
            ]
        }))
        .unwrap();

        assert_eq!(doc.trace_data.len(), 1);
        assert_eq!(doc.metadata, serde_json::Value::Null);
    }

    #[test]
    fn missing_trace_data_is_an_error() {
        let err = parse_document(&json!({"metadata": {}})).unwrap_err();
        assert!(matches!(err, ParseError::MissingTraceData));
    }

    #[test]
    fn batch_keeps_going_past_bad_documents() {
        let results = parse_documents(&[
            json!({"trace_data": []}),
            json!("not an object"),
            json!({"trace_data": [
                {"location": "b.py:3", "name": "f", "call_type": "method", "depth": 0}
            ]}),
        ]);

        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().trace_data.len(), 1);
    }

    #[test]
    fn import_like_call_types_are_not_callable() {
        assert!(!CallType::Import.is_callable());
        assert!(!CallType::ClassDeclaration.is_callable());
        assert!(!CallType::ExternalCall.is_callable());
        assert!(CallType::FunctionCall.is_callable());
        assert!(CallType::Method.is_callable());
    }
}
