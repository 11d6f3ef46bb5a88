//! Stack projections and path utilities.
//!
//! A path here is always a root-first sequence of occurrences; two paths
//! are "the same logical path" when their canonical-location sequences
//! match, even if they were built from different underlying occurrences.

pub mod enumerate;

pub use enumerate::{alternate_paths, find_paths, PathQuery, SubstitutionBreadth};

use crate::graph::{LocationId, NodeId, TraceGraph};
use crate::utils::config::{IMPORT_CALL_SENTINEL, IMPORT_MACHINERY_MARKERS};
use std::collections::HashSet;

/// Project a root-first path into debugger-"where" form
///
/// Rule: the deepest entry shows its own location with the line number
/// incremented by one (the next line to execute at this breakpoint);
/// every other entry shows the caller's currently executing line, taken
/// from the next-deeper frame's recorded parent location. Caller lines
/// produced by import-resolution machinery collapse to the
/// `<import_call>` sentinel instead of exposing resolver internals.
pub fn path_to_where(graph: &TraceGraph, path: &[NodeId]) -> Vec<String> {
    let Some((&last, callers)) = path.split_last() else {
        return Vec::new();
    };

    // The outermost frame of a gap-free path is a true root.
    debug_assert!(
        graph.node(path[0]).depth == 0 || graph.has_gaps(),
        "path starts below depth 0 without a recorded structural gap"
    );

    let mut trace = Vec::with_capacity(path.len());
    for (i, &caller) in callers.iter().enumerate() {
        let callee = path[i + 1];
        trace.push(caller_line(graph, callee, caller));
    }
    trace.push(increment_line(graph.location(last).location()));
    trace
}

/// The line a caller frame is currently executing: the callee's recorded
/// parent location, the sentinel for import machinery, or the caller's
/// own location when nothing was recorded.
fn caller_line(graph: &TraceGraph, callee: NodeId, caller: NodeId) -> String {
    match &graph.node(callee).parent_location {
        Some(loc) if is_import_machinery(loc) => IMPORT_CALL_SENTINEL.to_string(),
        Some(loc) => loc.clone(),
        None => graph.location(caller).location().to_string(),
    }
}

/// Whether a location string points into import-resolution machinery
pub fn is_import_machinery(location: &str) -> bool {
    IMPORT_MACHINERY_MARKERS
        .iter()
        .any(|marker| location.contains(marker))
}

/// Increment the ":line" suffix of a location string by one
///
/// Malformed locations (no numeric ":line" suffix) are returned unchanged
/// rather than raising; bracketed pseudo-locations keep working because
/// only the last colon-separated field is touched.
pub fn increment_line(location: &str) -> String {
    match location.rsplit_once(':') {
        Some((file, line)) => match line.parse::<u64>() {
            Ok(n) => format!("{}:{}", file, n + 1),
            Err(_) => location.to_string(),
        },
        None => location.to_string(),
    }
}

/// Location strings of a path, root-first
pub fn to_sequence(graph: &TraceGraph, path: &[NodeId]) -> Vec<String> {
    path.iter()
        .map(|&id| graph.location(id).location().to_string())
        .collect()
}

/// Canonical-location identity sequence of a path (the dedup key)
pub fn location_sequence(graph: &TraceGraph, path: &[NodeId]) -> Vec<LocationId> {
    path.iter().map(|&id| graph.node(id).location).collect()
}

/// Whether no two paths share an identical location sequence
pub fn is_distinct_paths(graph: &TraceGraph, paths: &[Vec<NodeId>]) -> bool {
    let mut seen = HashSet::with_capacity(paths.len());
    paths
        .iter()
        .all(|path| seen.insert(location_sequence(graph, path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_well_formed_locations() {
        assert_eq!(increment_line("src/app.py:41"), "src/app.py:42");
        assert_eq!(increment_line("<module>:3"), "<module>:4");
    }

    #[test]
    fn malformed_locations_pass_through_unchanged() {
        assert_eq!(increment_line("src/app.py"), "src/app.py");
        assert_eq!(increment_line("weird:place:here"), "weird:place:here");
    }

    #[test]
    fn recognizes_import_machinery() {
        assert!(is_import_machinery("<frozen importlib._bootstrap>:220"));
        assert!(is_import_machinery("lib/importlib._bootstrap_external.py:850"));
        assert!(!is_import_machinery("src/app.py:41"));
    }
}
