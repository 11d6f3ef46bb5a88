//! Canonical location interning.
//!
//! A canonical location is the unit of "sameness" across repeated calls:
//! the (location, name, call_type, is_external) tuple. The registry
//! guarantees one identity per distinct tuple no matter how many times it
//! is hit, and owns the chronological occurrence list for each identity.
//!
//! The registry is owned by the caller of the graph builder and passed in
//! by mutable reference; the built graph then holds a shared borrow, so
//! `clear()` (the reset between independent traces) is statically
//! impossible while any graph is alive.

use crate::graph::{LocationId, NodeId};
use crate::parser::{CallType, TraceEvent};
use std::collections::HashMap;

/// Interning key: the identity tuple of a canonical location
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey {
    pub location: String,
    pub name: String,
    pub call_type: CallType,
    pub is_external: bool,
}

impl From<&TraceEvent> for LocationKey {
    fn from(event: &TraceEvent) -> Self {
        Self {
            location: event.location.clone(),
            name: event.name.clone(),
            call_type: event.call_type,
            is_external: event.is_external,
        }
    }
}

/// Interned identity for a distinct source position + call classification
///
/// Owns the ordered list of every occurrence created at this identity;
/// insertion order is chronological order. The list only grows during a
/// build and is frozen once the build finishes.
#[derive(Debug)]
pub struct CanonicalLocation {
    key: LocationKey,
    occurrences: Vec<NodeId>,
}

impl CanonicalLocation {
    pub fn location(&self) -> &str {
        &self.key.location
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn call_type(&self) -> CallType {
        self.key.call_type
    }

    pub fn is_external(&self) -> bool {
        self.key.is_external
    }

    /// True unless this identity is an import, class declaration, or
    /// external call - the classifications that can't be a calling frame.
    pub fn is_callable(&self) -> bool {
        self.key.call_type.is_callable()
    }

    pub fn key(&self) -> &LocationKey {
        &self.key
    }

    /// All occurrences at this identity, in chronological order
    pub fn occurrences(&self) -> &[NodeId] {
        &self.occurrences
    }

    pub fn first_occurrence(&self) -> Option<NodeId> {
        self.occurrences.first().copied()
    }

    pub fn last_occurrence(&self) -> Option<NodeId> {
        self.occurrences.last().copied()
    }
}

/// Interning table mapping identity tuples to canonical locations
#[derive(Debug, Default)]
pub struct LocationRegistry {
    index: HashMap<LocationKey, LocationId>,
    locations: Vec<CanonicalLocation>,
}

impl LocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the existing canonical location for this identity tuple if
    /// present, else create and store one. Pure lookup/insert.
    pub fn intern(&mut self, key: LocationKey) -> LocationId {
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = LocationId(self.locations.len());
        self.locations.push(CanonicalLocation {
            key: key.clone(),
            occurrences: Vec::new(),
        });
        self.index.insert(key, id);
        id
    }

    /// Look up an identity without inserting
    pub fn lookup(&self, key: &LocationKey) -> Option<LocationId> {
        self.index.get(key).copied()
    }

    pub fn get(&self, id: LocationId) -> &CanonicalLocation {
        &self.locations[id.0]
    }

    pub(crate) fn record_occurrence(&mut self, id: LocationId, node: NodeId) {
        self.locations[id.0].occurrences.push(node);
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LocationId, &CanonicalLocation)> {
        self.locations
            .iter()
            .enumerate()
            .map(|(i, loc)| (LocationId(i), loc))
    }

    /// Drop all entries. Used between independent traces to bound memory
    /// and avoid identity leakage across unrelated runs. Must not be
    /// called mid-build (the borrow checker enforces this: a built graph
    /// keeps the registry shared-borrowed).
    pub fn clear(&mut self) {
        self.index.clear();
        self.locations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(location: &str, name: &str) -> LocationKey {
        LocationKey {
            location: location.to_string(),
            name: name.to_string(),
            call_type: CallType::FunctionCall,
            is_external: false,
        }
    }

    #[test]
    fn interning_dedups_identical_tuples() {
        let mut registry = LocationRegistry::new();
        let a = registry.intern(key("a.py:1", "main"));
        let b = registry.intern(key("a.py:1", "main"));
        let c = registry.intern(key("a.py:2", "main"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn identity_includes_call_type_and_externality() {
        let mut registry = LocationRegistry::new();
        let plain = registry.intern(key("a.py:1", "main"));
        let external = registry.intern(LocationKey {
            is_external: true,
            ..key("a.py:1", "main")
        });
        let import = registry.intern(LocationKey {
            call_type: CallType::Import,
            ..key("a.py:1", "main")
        });

        assert_ne!(plain, external);
        assert_ne!(plain, import);
        assert!(!registry.get(import).is_callable());
    }

    #[test]
    fn clear_resets_between_traces() {
        let mut registry = LocationRegistry::new();
        registry.intern(key("a.py:1", "main"));
        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(registry.lookup(&key("a.py:1", "main")), None);
    }
}
