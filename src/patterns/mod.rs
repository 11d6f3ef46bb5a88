//! Pattern compression for chronological event runs.
//!
//! Long repeating contiguous subsequences (loops, recursive fan-out) are
//! folded into nested [`PatternGroup`] descriptors for presentation. The
//! transformation is lossless: expanding every group by its repetition
//! count reproduces the original flat sequence exactly.

pub mod grouper;

pub use grouper::{flatten, group_trace_patterns, PatternGrouper};

use crate::parser::TraceEvent;
use serde::{Deserialize, Serialize};

/// Discriminant for compressed nodes, serialized as `"pattern_group"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    PatternGroup,
}

/// A compressed, possibly nested, contiguous repeating run of events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternGroup {
    #[serde(rename = "type")]
    pub kind: GroupKind,

    /// Number of events in one repetition of the pattern
    pub pattern_length: usize,

    /// How many times the pattern repeats consecutively
    pub repetitions: usize,

    /// The first occurrence's events, themselves recursively grouped
    pub pattern_calls: Vec<GroupedCall>,

    /// Total events consumed by the whole span
    pub total_calls: usize,

    /// Span bounds in the original flat sequence (inclusive)
    pub start_index: usize,
    pub end_index: usize,
}

/// One node of the compressed event tree: a plain event or a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupedCall {
    Group(PatternGroup),
    Call(TraceEvent),
}
