//! Execution graph: arena, canonical locations, and navigation.
//!
//! Every accepted event becomes one [`CallOccurrence`] in an arena owned
//! by the [`TraceGraph`]; canonical identities live in the caller-owned
//! [`LocationRegistry`]. Both directions of every relationship (up/down
//! nesting, prev/next chronology, location/occurrence membership) are
//! plain arena indices, which removes the reference cycles a naive
//! back-pointer design would create.

pub mod builder;
pub mod registry;

pub use builder::{build_graph, BuildOptions, GapWarning};
pub use registry::{CanonicalLocation, LocationKey, LocationRegistry};

use crate::utils::config::SITE_PACKAGES_SEGMENT;
use std::cell::OnceCell;
use std::collections::BTreeSet;

/// Stable index of a canonical location inside its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationId(pub(crate) usize);

impl LocationId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stable index of a call occurrence inside its graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One concrete event instance in the timeline
///
/// Linked into both the call-nesting structure (`up`/`down`) and the
/// chronological structure (`prev`/`next`). The occurrence never outlives
/// the graph that owns it; all links are indices into that graph.
#[derive(Debug)]
pub struct CallOccurrence {
    /// Canonical identity of this occurrence
    pub location: LocationId,

    /// Nesting depth assigned by the collector
    pub depth: u32,

    /// Caller's source position, as recorded by the collector
    pub parent_location: Option<String>,

    /// Source text of the calling line
    pub parent_call: Option<String>,

    /// Captured call arguments
    pub arguments: serde_json::Map<String, serde_json::Value>,

    /// Immediate calling frame in the nesting structure
    pub up: Option<NodeId>,

    /// Occurrences nested directly beneath this one (inverse of `up`)
    pub down: Vec<NodeId>,

    /// Chronological neighbors, independent of nesting
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,

    // Forward chronological walk, computed on first access.
    runtime: OnceCell<Vec<NodeId>>,
}

impl CallOccurrence {
    pub(crate) fn new(
        location: LocationId,
        depth: u32,
        parent_location: Option<String>,
        parent_call: Option<String>,
        arguments: serde_json::Map<String, serde_json::Value>,
        up: Option<NodeId>,
        prev: Option<NodeId>,
    ) -> Self {
        Self {
            location,
            depth,
            parent_location,
            parent_call,
            arguments,
            up,
            down: Vec::new(),
            prev,
            next: None,
            runtime: OnceCell::new(),
        }
    }

    /// A leaf occurrence has nothing nested beneath it
    pub fn is_leaf(&self) -> bool {
        self.down.is_empty()
    }
}

/// The navigable execution graph built from one event batch
///
/// Holds the occurrence arena plus a shared borrow of the registry used
/// to build it; queries over stacks, chronology, and identities all go
/// through this handle. Nothing is mutated after construction.
#[derive(Debug)]
pub struct TraceGraph<'r> {
    registry: &'r LocationRegistry,
    nodes: Vec<CallOccurrence>,
    root: Option<NodeId>,
    warnings: Vec<GapWarning>,
    skipped_external: usize,
    leaves: OnceCell<Vec<NodeId>>,
}

impl<'r> TraceGraph<'r> {
    pub(crate) fn new(
        registry: &'r LocationRegistry,
        nodes: Vec<CallOccurrence>,
        warnings: Vec<GapWarning>,
        skipped_external: usize,
    ) -> Self {
        let root = if nodes.is_empty() { None } else { Some(NodeId(0)) };
        Self {
            registry,
            nodes,
            root,
            warnings,
            skipped_external,
            leaves: OnceCell::new(),
        }
    }

    /// The registry this graph was built against
    pub fn registry(&self) -> &LocationRegistry {
        self.registry
    }

    /// First occurrence in emission order, if any events were accepted
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &CallOccurrence {
        &self.nodes[id.0]
    }

    /// Canonical location of an occurrence
    pub fn location(&self, id: NodeId) -> &CanonicalLocation {
        self.registry.get(self.nodes[id.0].location)
    }

    pub fn location_by_id(&self, id: LocationId) -> &CanonicalLocation {
        self.registry.get(id)
    }

    /// All occurrences in chronological (arena) order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Structural gaps recorded during the build
    pub fn warnings(&self) -> &[GapWarning] {
        &self.warnings
    }

    pub fn has_gaps(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// External events dropped before linking (when the build skipped them)
    pub fn skipped_external(&self) -> usize {
        self.skipped_external
    }

    /// Whether this occurrence is the first ever recorded at its identity
    pub fn is_first_call(&self, id: NodeId) -> bool {
        self.location(id).first_occurrence() == Some(id)
    }

    /// Whether this occurrence is the last ever recorded at its identity
    pub fn is_last_call(&self, id: NodeId) -> bool {
        self.location(id).last_occurrence() == Some(id)
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.0].is_leaf()
    }

    /// Call stack ending at `id`: index 0 is the outermost frame, the last
    /// element is `id` itself. O(depth).
    pub fn stack_trace(&self, id: NodeId) -> Vec<NodeId> {
        let mut trace = Vec::with_capacity(self.nodes[id.0].depth as usize + 1);
        let mut current = Some(id);
        while let Some(node) = current {
            trace.push(node);
            current = self.nodes[node.0].up;
        }
        trace.reverse();
        trace
    }

    /// Debugger-"where" projection of the stack ending at `id`
    ///
    /// Each caller frame shows its currently executing line (the callee's
    /// recorded parent location); the deepest entry shows its own location
    /// with the line number incremented by one.
    pub fn where_trace(&self, id: NodeId) -> Vec<String> {
        crate::paths::path_to_where(self, &self.stack_trace(id))
    }

    /// Chronological walk forward from `id` (inclusive), memoized on
    /// first access
    pub fn runtime_trace(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id.0].runtime.get_or_init(|| {
            let mut trace = Vec::new();
            let mut current = Some(id);
            while let Some(node) = current {
                trace.push(node);
                current = self.nodes[node.0].next;
            }
            trace
        })
    }

    /// Chronological walk backward from `id`, returned root-first
    pub fn past(&self, id: NodeId) -> Vec<NodeId> {
        let mut trace = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            trace.push(node);
            current = self.nodes[node.0].prev;
        }
        trace.reverse();
        trace
    }

    /// First node of the chronological chain containing `id`
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(prev) = self.nodes[current.0].prev {
            current = prev;
        }
        current
    }

    /// Topmost nesting ancestor of `id` (itself if it has no caller)
    pub fn top_frame(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(up) = self.nodes[current.0].up {
            current = up;
        }
        current
    }

    /// All leaf occurrences in chronological order, memoized
    pub fn leaf_nodes(&self) -> &[NodeId] {
        self.leaves.get_or_init(|| {
            self.node_ids().filter(|&id| self.is_leaf(id)).collect()
        })
    }

    /// Distinct externally-installed package names seen in locations
    ///
    /// External frames are often logged with full interpreter paths; the
    /// package name is the path segment right after `/site-packages/`.
    pub fn external_packages(&self) -> BTreeSet<String> {
        let mut packages = BTreeSet::new();
        for (_, location) in self.registry.iter() {
            if let Some(rest) = location
                .location()
                .split(SITE_PACKAGES_SEGMENT)
                .nth(1)
            {
                if let Some(package) = rest.split('/').next() {
                    if !package.is_empty() {
                        packages.insert(package.to_string());
                    }
                }
            }
        }
        packages
    }
}
