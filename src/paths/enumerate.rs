//! Alternate call-path enumeration.
//!
//! A canonical location may be reached many times over a run through
//! different call chains. Given a target occurrence, this module
//! enumerates every structurally distinct chain of canonical locations
//! ending at the target's location. The key move: a stack frame can be
//! substituted by *any* other historical occurrence of the same code
//! location, not only the one actually observed, because both represent
//! the same call site under potentially different outer context.
//!
//! Cycles are blocked structurally by a visited-identity set; results are
//! deduplicated by location sequence and returned in discovery order.

use super::{location_sequence, to_sequence};
use crate::graph::{LocationId, NodeId, TraceGraph};
use log::debug;
use std::collections::HashSet;

/// How aggressively ancestor frames may be substituted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubstitutionBreadth {
    /// Substitute recursively at every stack level (fully combinatorial)
    #[default]
    Full,
    /// Branch off exactly one ancestor of the actual stack at a time,
    /// re-deriving the upper part from the substitute's own stack
    SingleLevel,
}

/// Parameters for a path enumeration
#[derive(Debug, Clone, Default)]
pub struct PathQuery {
    pub breadth: SubstitutionBreadth,

    /// Stop expanding once this many unique paths were found. The only
    /// safety valve against combinatorial blow-up on pathological inputs
    /// (a location hit thousands of times at shallow depth).
    pub max_paths: Option<usize>,
}

impl PathQuery {
    pub fn with_max_paths(max_paths: usize) -> Self {
        Self {
            max_paths: Some(max_paths),
            ..Self::default()
        }
    }
}

/// Collects unique paths, keyed by location sequence, bounded by the cap
struct PathSink {
    seen: HashSet<Vec<LocationId>>,
    paths: Vec<Vec<NodeId>>,
    max_paths: Option<usize>,
}

impl PathSink {
    fn new(max_paths: Option<usize>) -> Self {
        Self {
            seen: HashSet::new(),
            paths: Vec::new(),
            max_paths,
        }
    }

    /// Record a complete root-first path; returns false once enumeration
    /// should stop.
    fn emit(&mut self, graph: &TraceGraph, path: Vec<NodeId>) -> bool {
        if self.seen.insert(location_sequence(graph, &path)) {
            self.paths.push(path);
        }
        match self.max_paths {
            Some(cap) => self.paths.len() < cap,
            None => true,
        }
    }

    fn open(&self) -> bool {
        match self.max_paths {
            Some(cap) => self.paths.len() < cap,
            None => true,
        }
    }
}

/// Enumerate every structurally distinct path ending at `target`'s
/// canonical location
///
/// **Public** - main entry point for path enumeration
///
/// # Arguments
/// * `graph` - Built trace graph
/// * `target` - Occurrence whose program point the paths must reach
/// * `query` - Substitution breadth and optional unique-path cap
///
/// # Returns
/// Root-first occurrence paths in discovery order, deduplicated by
/// location sequence. Every returned path ends at the target's canonical
/// location and repeats no location (cycle-free). The path actually
/// observed is included when the cap allows it.
pub fn find_paths(graph: &TraceGraph, target: NodeId, query: &PathQuery) -> Vec<Vec<NodeId>> {
    let mut sink = PathSink::new(query.max_paths);

    match query.breadth {
        SubstitutionBreadth::Full => {
            let mut chain = Vec::new();
            let mut visited = HashSet::new();
            full_dfs(graph, Some(target), &mut chain, &mut visited, &mut sink);
        }
        SubstitutionBreadth::SingleLevel => {
            single_level(graph, target, &mut sink);
        }
    }

    debug!(
        "Enumerated {} unique paths to {} ({:?})",
        sink.paths.len(),
        graph.location(target).location(),
        query.breadth
    );

    let target_location = graph.node(target).location;
    debug_assert!(
        sink.paths
            .iter()
            .all(|p| p.last().map(|&id| graph.node(id).location) == Some(target_location)),
        "enumerated path does not end at the query's canonical location"
    );
    debug_assert!(
        super::is_distinct_paths(graph, &sink.paths),
        "enumerated paths are not distinct by location sequence"
    );

    sink.paths
}

/// Like [`find_paths`], minus the path whose location sequence equals the
/// actually observed stack trace
pub fn alternate_paths(graph: &TraceGraph, target: NodeId, query: &PathQuery) -> Vec<Vec<NodeId>> {
    let actual = to_sequence(graph, &graph.stack_trace(target));
    find_paths(graph, target, query)
        .into_iter()
        .filter(|path| to_sequence(graph, path) != actual)
        .collect()
}

/// Fully recursive substitution: at every level, the current frame may be
/// replaced by any occurrence of its own canonical location, after which
/// the walk ascends through that substitute's actual caller.
///
/// `chain` holds the frames chosen so far, deepest-first; `visited`
/// mirrors their location identities and is the cycle guard. A frame
/// blocked by the guard simply contributes no paths; the branch dies.
/// Returns false once the sink closed.
fn full_dfs(
    graph: &TraceGraph,
    current: Option<NodeId>,
    chain: &mut Vec<NodeId>,
    visited: &mut HashSet<LocationId>,
    sink: &mut PathSink,
) -> bool {
    let Some(node) = current else {
        // Walked past a root: the chain is a complete path, deepest-first.
        let mut path: Vec<NodeId> = chain.clone();
        path.reverse();
        return sink.emit(graph, path);
    };

    let location = graph.node(node).location;
    if visited.contains(&location) {
        return true;
    }

    for &substitute in graph.location_by_id(location).occurrences() {
        if !sink.open() {
            return false;
        }
        chain.push(substitute);
        visited.insert(location);
        let keep_going = full_dfs(graph, graph.node(substitute).up, chain, visited, sink);
        visited.remove(&location);
        chain.pop();
        if !keep_going {
            return false;
        }
    }
    true
}

/// Single-level substitution: for each frame of the actual stack, swap in
/// any sibling occurrence of that frame's location, take the sibling's own
/// stack above the branch point, and keep the original frames below it.
fn single_level(graph: &TraceGraph, target: NodeId, sink: &mut PathSink) {
    let stack = graph.stack_trace(target);

    for level in (0..stack.len()).rev() {
        let branch_location = graph.node(stack[level]).location;
        for &sibling in graph.location_by_id(branch_location).occurrences() {
            let mut path = graph.stack_trace(sibling);
            path.extend_from_slice(&stack[level + 1..]);

            if has_repeated_location(graph, &path) {
                continue;
            }
            if !sink.emit(graph, path) {
                return;
            }
        }
    }
}

fn has_repeated_location(graph: &TraceGraph, path: &[NodeId]) -> bool {
    let mut seen = HashSet::with_capacity(path.len());
    !path.iter().all(|&id| seen.insert(graph.node(id).location))
}
