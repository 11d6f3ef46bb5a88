//! Input schema definitions for collector event logs.
//!
//! This module defines the JSON contract between the instrumentation
//! collector and this crate. Events arrive in emission order inside a
//! trace document; the free-form `metadata` object passes through
//! untouched.

use serde::{Deserialize, Serialize};

/// Call classification assigned by the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    FunctionCall,
    Method,
    ClassInstantiation,
    ClassDeclaration,
    SpecialMethod,
    CallableObject,
    LambdaFunction,
    Comprehension,
    ModuleExecution,
    Import,
    ExternalCall,
    /// Classification this crate does not know about. Kept rather than
    /// rejected so one odd event cannot fail a whole document.
    #[serde(other)]
    Unknown,
}

impl CallType {
    /// Whether an event of this classification represents code that can
    /// itself appear as a calling frame.
    pub fn is_callable(self) -> bool {
        !matches!(
            self,
            CallType::Import | CallType::ClassDeclaration | CallType::ExternalCall
        )
    }
}

/// One call event as emitted by the collector
///
/// `depth` is the nesting level assigned by the collector (0 = outermost
/// traced frame). `arguments` values are already size-truncated upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Source position, "path:line" or a bracketed pseudo-location
    /// such as "<module>:12"
    pub location: String,

    /// Human-readable name of the called code object
    pub name: String,

    /// Call classification
    pub call_type: CallType,

    /// Nesting depth assigned by the collector
    pub depth: u32,

    /// True when the frame lives outside the traced scope
    #[serde(default)]
    pub is_external: bool,

    /// Caller's source position ("path:line"), if recorded
    #[serde(default)]
    pub parent_location: Option<String>,

    /// Source text of the calling line, if recorded
    #[serde(default)]
    pub parent_call: Option<String>,

    /// Captured call arguments, in declaration order
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

/// A full trace document: ordered events plus pass-through metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDocument {
    /// Free-form collector metadata (original invocation, scope path,
    /// timestamps). Never interpreted here.
    #[serde(default)]
    pub metadata: serde_json::Value,

    /// Events in emission order
    pub trace_data: Vec<TraceEvent>,
}
