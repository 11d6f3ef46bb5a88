//! Repeating-pattern detection over chronological event sequences.
//!
//! Scans pattern lengths from a generous upper bound downward so an outer
//! loop is captured whole instead of fragmenting into many small spurious
//! inner matches. Matching is greedy and exact: no tolerance for a
//! partial final repeat.

use super::{GroupKind, GroupedCall, PatternGroup};
use crate::parser::TraceEvent;
use crate::utils::config::{
    DEFAULT_MIN_PATTERN_LENGTH, DEFAULT_MIN_REPETITIONS, MAX_PATTERN_SCAN_LENGTH,
};
use log::debug;

/// A detected repetition span in the token sequence
#[derive(Debug, Clone, Copy)]
struct PatternSpan {
    start: usize,
    length: usize,
    repetitions: usize,
}

/// Detects and folds repeating contiguous event runs
#[derive(Debug, Clone)]
pub struct PatternGrouper {
    min_pattern_length: usize,
    min_repetitions: usize,
}

impl Default for PatternGrouper {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PATTERN_LENGTH, DEFAULT_MIN_REPETITIONS)
    }
}

impl PatternGrouper {
    pub fn new(min_pattern_length: usize, min_repetitions: usize) -> Self {
        Self {
            min_pattern_length,
            min_repetitions,
        }
    }

    /// Fold repeating runs of `events` into nested group descriptors.
    /// Non-matched events pass through unchanged.
    pub fn group_patterns(&self, events: &[TraceEvent]) -> Vec<GroupedCall> {
        if events.is_empty() {
            return Vec::new();
        }

        let tokens = simplify_calls(events);
        let spans = self.find_patterns(&tokens);
        debug!(
            "Pattern scan over {} events found {} repetition spans",
            events.len(),
            spans.len()
        );
        self.apply_patterns(events, &spans)
    }

    /// Find repetition spans, longest pattern lengths first
    fn find_patterns(&self, tokens: &[String]) -> Vec<PatternSpan> {
        let mut spans = Vec::new();
        let mut used = vec![false; tokens.len()];

        let upper = MAX_PATTERN_SCAN_LENGTH.min(tokens.len() / 2);
        for length in (self.min_pattern_length..=upper).rev() {
            let mut i = 0;
            while i + length * self.min_repetitions <= tokens.len() {
                if used[i] {
                    i += 1;
                    continue;
                }

                let pattern = &tokens[i..i + length];
                let repetitions = count_repetitions(tokens, i, pattern);

                if repetitions >= self.min_repetitions {
                    let total = length * repetitions;
                    spans.push(PatternSpan {
                        start: i,
                        length,
                        repetitions,
                    });
                    for flag in &mut used[i..i + total] {
                        *flag = true;
                    }
                    i += total;
                } else {
                    i += 1;
                }
            }
        }

        spans.sort_by_key(|span| span.start);
        spans
    }

    /// Rebuild the sequence, replacing detected spans with groups
    fn apply_patterns(&self, events: &[TraceEvent], spans: &[PatternSpan]) -> Vec<GroupedCall> {
        if spans.is_empty() {
            return events.iter().cloned().map(GroupedCall::Call).collect();
        }

        let mut grouped = Vec::new();
        let mut i = 0;

        while i < events.len() {
            if let Some(span) = spans.iter().find(|span| span.start == i) {
                let total = span.length * span.repetitions;
                let first_occurrence = &events[i..i + span.length];

                grouped.push(GroupedCall::Group(PatternGroup {
                    kind: GroupKind::PatternGroup,
                    pattern_length: span.length,
                    repetitions: span.repetitions,
                    pattern_calls: self.find_nested_patterns(first_occurrence),
                    total_calls: total,
                    start_index: span.start,
                    end_index: span.start + total - 1,
                }));
                i += total;
            } else {
                grouped.push(GroupedCall::Call(events[i].clone()));
                i += 1;
            }
        }

        grouped
    }

    /// Recurse into one pattern occurrence to detect nested repetition
    fn find_nested_patterns(&self, occurrence: &[TraceEvent]) -> Vec<GroupedCall> {
        if occurrence.len() < self.min_pattern_length * self.min_repetitions {
            return occurrence.iter().cloned().map(GroupedCall::Call).collect();
        }
        PatternGrouper::new(DEFAULT_MIN_PATTERN_LENGTH, DEFAULT_MIN_REPETITIONS)
            .group_patterns(occurrence)
    }
}

/// Identity token per event for pattern matching
fn simplify_calls(events: &[TraceEvent]) -> Vec<String> {
    events
        .iter()
        .map(|event| format!("{}@{}", event.name, event.location))
        .collect()
}

/// Count how many times `pattern` repeats consecutively from `start`
fn count_repetitions(tokens: &[String], start: usize, pattern: &[String]) -> usize {
    let mut repetitions = 0;
    let mut idx = start;
    while idx + pattern.len() <= tokens.len() && tokens[idx..idx + pattern.len()] == *pattern {
        repetitions += 1;
        idx += pattern.len();
    }
    repetitions
}

/// Group patterns with explicit thresholds
pub fn group_trace_patterns(
    events: &[TraceEvent],
    min_pattern_length: usize,
    min_repetitions: usize,
) -> Vec<GroupedCall> {
    PatternGrouper::new(min_pattern_length, min_repetitions).group_patterns(events)
}

/// Expand a compressed tree back to the original flat sequence
pub fn flatten(grouped: &[GroupedCall]) -> Vec<TraceEvent> {
    let mut events = Vec::new();
    for call in grouped {
        match call {
            GroupedCall::Call(event) => events.push(event.clone()),
            GroupedCall::Group(group) => {
                let one_repetition = flatten(&group.pattern_calls);
                for _ in 0..group.repetitions {
                    events.extend(one_repetition.iter().cloned());
                }
            }
        }
    }
    events
}
