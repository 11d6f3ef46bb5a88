//! Where-entry dataset assembly.
//!
//! The training/analysis use case behind alternate-path enumeration: pick
//! interesting occurrences, pair each one's actual stack trace with every
//! distinct alternative chain reaching the same program point, and export
//! the result as a flat, JSON-friendly dataset.

use crate::graph::{NodeId, TraceGraph};
use crate::parser::CallType;
use crate::paths::{self, alternate_paths, find_paths, PathQuery};
use crate::utils::config::{DEFAULT_MAX_SIBLINGS, DEFAULT_MIN_PATH_COUNT, SCHEMA_VERSION};
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Selection and enumeration parameters for dataset building
#[derive(Debug, Clone)]
pub struct DatasetOptions {
    /// Minimum total path count an occurrence must have to be kept
    pub min_path_count: usize,

    /// In leaf-only mode, cap on leaf children kept per parent
    pub max_siblings: usize,

    /// Restrict selection to leaf occurrences, capped per parent
    pub leaves_only: bool,

    /// Path enumeration parameters
    pub query: PathQuery,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            min_path_count: DEFAULT_MIN_PATH_COUNT,
            max_siblings: DEFAULT_MAX_SIBLINGS,
            leaves_only: false,
            query: PathQuery::default(),
        }
    }
}

/// The output of a "where" query at one occurrence, together with every
/// alternative path reaching the same program point
#[derive(Debug, Clone)]
pub struct WhereEntry {
    /// Occurrence the entry was built for
    pub node: NodeId,

    /// The stack actually observed, root-first
    pub stack_trace: Vec<NodeId>,

    /// Distinct alternative chains, excluding the observed one
    pub alternate_paths: Vec<Vec<NodeId>>,

    /// Optional command text associated with the query
    pub command: Option<String>,
}

/// Select the occurrences worth building where entries for
///
/// Pipeline (in order): keep occurrences that are the first or last call
/// of their canonical location; drop external ones; require at least
/// `min_path_count` total paths. Then either restrict to leaf nodes with
/// a per-parent sibling cap, or keep one occurrence per canonical
/// location.
pub fn select_nodes(graph: &TraceGraph, options: &DatasetOptions) -> Vec<NodeId> {
    let mut kept: Vec<NodeId> = graph
        .node_ids()
        .filter(|&id| graph.is_first_call(id) || graph.is_last_call(id))
        .filter(|&id| !graph.location(id).is_external())
        .filter(|&id| find_paths(graph, id, &options.query).len() >= options.min_path_count)
        .collect();

    info!(
        "Kept {} first/last occurrences with at least {} paths",
        kept.len(),
        options.min_path_count
    );

    if options.leaves_only {
        let mut parents: Vec<NodeId> = kept
            .iter()
            .filter(|&&id| graph.is_leaf(id))
            .filter_map(|&id| graph.node(id).up)
            .collect();
        parents.sort();
        parents.dedup();

        let mut subsampled = Vec::new();
        for parent in parents {
            let mut leaves: Vec<NodeId> = graph
                .node(parent)
                .down
                .iter()
                .copied()
                .filter(|&child| graph.is_leaf(child) && !graph.location(child).is_external())
                .collect();
            // Deterministic cap: chronologically first siblings win.
            leaves.truncate(options.max_siblings);
            subsampled.extend(leaves);
        }
        subsampled
    } else {
        // One entry per canonical location; the earliest occurrence wins.
        let mut seen = HashSet::new();
        kept.retain(|&id| seen.insert(graph.node(id).location));
        kept
    }
}

/// Build where entries for every selected occurrence
pub fn build_where_entries(graph: &TraceGraph, options: &DatasetOptions) -> Vec<WhereEntry> {
    let entries: Vec<WhereEntry> = select_nodes(graph, options)
        .into_iter()
        .map(|node| WhereEntry {
            node,
            stack_trace: graph.stack_trace(node),
            alternate_paths: alternate_paths(graph, node, &options.query),
            command: None,
        })
        .collect();

    debug_assert!(
        entries
            .iter()
            .all(|entry| paths::is_distinct_paths(graph, &entry.alternate_paths)),
        "where entry holds non-distinct alternate paths"
    );

    debug!("Built {} where entries", entries.len());
    entries
}

/// Drop stack traces whose location set is a strict subset of another's
///
/// Given traces A and B, if A's locations form a strict subset of B's,
/// A carries no extra information and is removed.
pub fn remove_nested_traces(graph: &TraceGraph, traces: Vec<Vec<NodeId>>) -> Vec<Vec<NodeId>> {
    let mut kept: Vec<(Vec<NodeId>, HashSet<String>, Vec<String>)> = Vec::new();

    for trace in traces {
        let sequence = paths::to_sequence(graph, &trace);
        let set: HashSet<String> = sequence.iter().cloned().collect();
        let is_subset = kept.iter().any(|(_, other_set, other_sequence)| {
            sequence != *other_sequence && set.is_subset(other_set)
        });
        if !is_subset {
            kept.push((trace, set, sequence));
        }
    }

    kept.into_iter().map(|(trace, _, _)| trace).collect()
}

/// One serialized stack frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub location: String,
    pub name: String,
    pub call_type: CallType,
    pub is_external: bool,
    pub depth: u32,
    pub parent_location: Option<String>,
    pub parent_call: Option<String>,
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

impl FrameRecord {
    fn from_node(graph: &TraceGraph, id: NodeId) -> Self {
        let node = graph.node(id);
        let location = graph.location(id);
        Self {
            location: location.location().to_string(),
            name: location.name().to_string(),
            call_type: location.call_type(),
            is_external: location.is_external(),
            depth: node.depth,
            parent_location: node.parent_location.clone(),
            parent_call: node.parent_call.clone(),
            arguments: node.arguments.clone(),
        }
    }
}

/// One exported dataset row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub id: usize,
    pub stack_trace: Vec<FrameRecord>,
    pub alternate_paths: Vec<Vec<FrameRecord>>,
    pub stack_trace_locations: Vec<String>,
    pub stack_trace_names: Vec<String>,
    pub num_alternate_paths: usize,
    pub stack_trace_depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Selection parameters recorded alongside the exported rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Schema version for compatibility checking
    pub version: String,
    pub total_entries: usize,
    pub min_path_count: usize,
    pub max_siblings: usize,
    pub leaves_only: bool,
    /// Timestamp when the dataset was generated
    pub generated_at: String,
}

/// The exported where-entry dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhereDataset {
    pub metadata: DatasetMetadata,
    pub trace_data: Vec<DatasetEntry>,
}

/// Serialize where entries into the flat dataset form
pub fn export_dataset(
    graph: &TraceGraph,
    entries: &[WhereEntry],
    options: &DatasetOptions,
) -> WhereDataset {
    let trace_data = entries
        .iter()
        .enumerate()
        .map(|(id, entry)| {
            let stack_trace: Vec<FrameRecord> = entry
                .stack_trace
                .iter()
                .map(|&node| FrameRecord::from_node(graph, node))
                .collect();
            DatasetEntry {
                id,
                stack_trace_locations: paths::to_sequence(graph, &entry.stack_trace),
                stack_trace_names: stack_trace.iter().map(|f| f.name.clone()).collect(),
                num_alternate_paths: entry.alternate_paths.len(),
                stack_trace_depth: entry.stack_trace.len(),
                alternate_paths: entry
                    .alternate_paths
                    .iter()
                    .map(|path| {
                        path.iter()
                            .map(|&node| FrameRecord::from_node(graph, node))
                            .collect()
                    })
                    .collect(),
                stack_trace,
                command: entry.command.clone(),
            }
        })
        .collect();

    WhereDataset {
        metadata: DatasetMetadata {
            version: SCHEMA_VERSION.to_string(),
            total_entries: entries.len(),
            min_path_count: options.min_path_count,
            max_siblings: options.max_siblings,
            leaves_only: options.leaves_only,
            generated_at: Utc::now().to_rfc3339(),
        },
        trace_data,
    }
}
