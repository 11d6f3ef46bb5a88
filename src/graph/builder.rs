//! Trace graph construction.
//!
//! Threads each event of an ordered batch into both the call-nesting
//! structure (via the latest occurrence seen at each depth) and the
//! chronological chain, attaching every occurrence to its interned
//! canonical location.

use super::registry::{LocationKey, LocationRegistry};
use super::{CallOccurrence, NodeId, TraceGraph};
use crate::parser::TraceEvent;
use log::{debug, warn};
use std::collections::HashMap;

/// Options controlling graph construction
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Exclude `is_external` events from the graph entirely. Skipped
    /// events still count as linear input for diagnostics.
    pub skip_external: bool,
}

/// A structural gap: an event whose depth implies a parent that was never
/// recorded (filtered out upstream). Recovered by treating the occurrence
/// as a synthetic root; never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapWarning {
    /// Index of the event in the input batch
    pub event_index: usize,
    /// Location string of the orphaned event
    pub location: String,
    /// Depth at which the orphan appeared
    pub depth: u32,
}

/// Build a trace graph from an ordered event batch
///
/// **Public** - main entry point for graph construction
///
/// # Arguments
/// * `registry` - Caller-owned interning table; reset it between
///   independent traces with [`LocationRegistry::clear`]
/// * `events` - Events in emission order
/// * `options` - Build configuration
///
/// # Returns
/// The fully linked graph. The registry stays shared-borrowed for the
/// graph's lifetime, so it cannot be cleared or reused mid-query.
pub fn build_graph<'r>(
    registry: &'r mut LocationRegistry,
    events: &[TraceEvent],
    options: &BuildOptions,
) -> TraceGraph<'r> {
    let mut nodes: Vec<CallOccurrence> = Vec::with_capacity(events.len());
    let mut warnings = Vec::new();
    let mut skipped_external = 0usize;

    // Latest occurrence seen at each depth; depth d events attach to the
    // latest at depth d - 1.
    let mut last_at_depth: HashMap<u32, NodeId> = HashMap::new();
    let mut prev: Option<NodeId> = None;

    for (event_index, event) in events.iter().enumerate() {
        if options.skip_external && event.is_external {
            skipped_external += 1;
            continue;
        }

        let location = registry.intern(LocationKey::from(event));
        let id = NodeId(nodes.len());

        let up = if event.depth == 0 {
            None
        } else {
            last_at_depth.get(&(event.depth - 1)).copied()
        };

        if event.depth > 0 && up.is_none() {
            // Collector gaps are expected for externally-filtered frames;
            // the occurrence becomes a synthetic root.
            warn!(
                "Event {} at {} has depth {} but no recorded parent",
                event_index, event.location, event.depth
            );
            warnings.push(GapWarning {
                event_index,
                location: event.location.clone(),
                depth: event.depth,
            });
        }

        nodes.push(CallOccurrence::new(
            location,
            event.depth,
            event.parent_location.clone(),
            event.parent_call.clone(),
            event.arguments.clone(),
            up,
            prev,
        ));
        registry.record_occurrence(location, id);

        if let Some(p) = prev {
            nodes[p.0].next = Some(id);
        }
        if let Some(u) = up {
            nodes[u.0].down.push(id);
        }

        prev = Some(id);
        last_at_depth.insert(event.depth, id);
    }

    debug!(
        "Built trace graph: {} occurrences, {} canonical locations, {} gaps, {} external skipped",
        nodes.len(),
        registry.len(),
        warnings.len(),
        skipped_external
    );

    TraceGraph::new(registry, nodes, warnings, skipped_external)
}
