use crate::events::{ChangeObserver, CollectionChange};
use rdf_loom_common::error::{CorruptionError, StorageError};
use rdf_loom_model::{Node, Triple};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Which secondary indexes a [TripleIndexSet] maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexingMode {
    /// Single-component indexes (S, P, O) plus composite indexes
    /// (SP, SO, PO). Every two-bound lookup is a single map access.
    #[default]
    Full,
    /// Single-component indexes only. Two-bound lookups intersect the two
    /// candidate sets, scanning the smaller one. Saves memory on graphs
    /// with many low-cardinality predicates.
    Sparse,
}

type TripleSet = FxHashSet<Arc<Triple>>;

/// The storage engine: a set of unique triples with secondary indexes
/// answering all 8 bound/wildcard combinations of `find`.
///
/// Every mutation keeps all indexes consistent and reports the change to the
/// registered observers before returning. The returned iterators borrow the
/// collection, so the borrow checker statically rules out mutation during
/// iteration.
pub struct TripleIndexSet {
    triples: TripleSet,
    by_subject: FxHashMap<Node, TripleSet>,
    by_predicate: FxHashMap<Node, TripleSet>,
    by_object: FxHashMap<Node, TripleSet>,
    by_subject_predicate: FxHashMap<(Node, Node), TripleSet>,
    by_subject_object: FxHashMap<(Node, Node), TripleSet>,
    by_predicate_object: FxHashMap<(Node, Node), TripleSet>,
    mode: IndexingMode,
    observers: Vec<ChangeObserver>,
}

impl TripleIndexSet {
    pub fn new() -> Self {
        Self::with_mode(IndexingMode::Full)
    }

    pub fn with_mode(mode: IndexingMode) -> Self {
        Self {
            triples: TripleSet::default(),
            by_subject: FxHashMap::default(),
            by_predicate: FxHashMap::default(),
            by_object: FxHashMap::default(),
            by_subject_predicate: FxHashMap::default(),
            by_subject_object: FxHashMap::default(),
            by_predicate_object: FxHashMap::default(),
            mode,
            observers: Vec::new(),
        }
    }

    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        let mut collection = Self::new();
        for triple in triples {
            collection.insert(triple);
        }
        collection
    }

    pub fn mode(&self) -> IndexingMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Registers a synchronous change observer.
    pub fn on_change(&mut self, observer: ChangeObserver) {
        self.observers.push(observer);
    }

    fn notify(&self, change: &CollectionChange) {
        for observer in &self.observers {
            observer(change);
        }
    }

    /// Adds a triple. Returns `false` (a no-op, no notification) if it was
    /// already present.
    pub fn add(&mut self, triple: Triple) -> bool {
        let added = self.insert(triple.clone());
        if added {
            tracing::trace!(%triple, "triple added");
            self.notify(&CollectionChange::Added(vec![triple]));
        }
        added
    }

    /// Adds every triple, reporting all actually-added triples in a single
    /// coalesced notification. Returns the number added.
    pub fn add_all(&mut self, triples: impl IntoIterator<Item = Triple>) -> usize {
        let added: Vec<Triple> = triples
            .into_iter()
            .filter(|triple| self.insert(triple.clone()))
            .collect();
        let count = added.len();
        if count > 0 {
            tracing::trace!(count, "triples added");
            self.notify(&CollectionChange::Added(added));
        }
        count
    }

    /// Removes a triple. Returns `false` (a no-op, no notification) if it was
    /// absent.
    pub fn remove(&mut self, triple: &Triple) -> bool {
        let removed = self.delete(triple);
        if removed {
            tracing::trace!(%triple, "triple removed");
            self.notify(&CollectionChange::Removed(vec![triple.clone()]));
        }
        removed
    }

    /// Removes every triple, reporting all actually-removed triples in a
    /// single coalesced notification. Returns the number removed.
    pub fn remove_all<'a>(
        &mut self,
        triples: impl IntoIterator<Item = &'a Triple>,
    ) -> usize {
        let removed: Vec<Triple> = triples
            .into_iter()
            .filter(|triple| self.delete(triple))
            .cloned()
            .collect();
        let count = removed.len();
        if count > 0 {
            tracing::trace!(count, "triples removed");
            self.notify(&CollectionChange::Removed(removed));
        }
        count
    }

    /// Empties the collection and all indexes, firing a single reset
    /// notification.
    pub fn clear(&mut self) {
        self.triples.clear();
        self.by_subject.clear();
        self.by_predicate.clear();
        self.by_object.clear();
        self.by_subject_predicate.clear();
        self.by_subject_object.clear();
        self.by_predicate_object.clear();
        tracing::trace!("collection cleared");
        self.notify(&CollectionChange::Cleared);
    }

    fn insert(&mut self, triple: Triple) -> bool {
        if self.triples.contains(&triple) {
            return false;
        }
        let entry = Arc::new(triple);
        self.by_subject
            .entry(entry.subject.clone())
            .or_default()
            .insert(Arc::clone(&entry));
        self.by_predicate
            .entry(entry.predicate.clone())
            .or_default()
            .insert(Arc::clone(&entry));
        self.by_object
            .entry(entry.object.clone())
            .or_default()
            .insert(Arc::clone(&entry));
        if self.mode == IndexingMode::Full {
            self.by_subject_predicate
                .entry((entry.subject.clone(), entry.predicate.clone()))
                .or_default()
                .insert(Arc::clone(&entry));
            self.by_subject_object
                .entry((entry.subject.clone(), entry.object.clone()))
                .or_default()
                .insert(Arc::clone(&entry));
            self.by_predicate_object
                .entry((entry.predicate.clone(), entry.object.clone()))
                .or_default()
                .insert(Arc::clone(&entry));
        }
        self.triples.insert(entry);
        true
    }

    fn delete(&mut self, triple: &Triple) -> bool {
        let Some(entry) = self.triples.take(triple) else {
            return false;
        };
        remove_from_index(&mut self.by_subject, &entry.subject, &entry);
        remove_from_index(&mut self.by_predicate, &entry.predicate, &entry);
        remove_from_index(&mut self.by_object, &entry.object, &entry);
        if self.mode == IndexingMode::Full {
            remove_from_pair_index(
                &mut self.by_subject_predicate,
                (entry.subject.clone(), entry.predicate.clone()),
                &entry,
            );
            remove_from_pair_index(
                &mut self.by_subject_object,
                (entry.subject.clone(), entry.object.clone()),
                &entry,
            );
            remove_from_pair_index(
                &mut self.by_predicate_object,
                (entry.predicate.clone(), entry.object.clone()),
                &entry,
            );
        }
        true
    }

    /// All triples.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter().map(|entry| entry.as_ref())
    }

    /// Pattern lookup: each of subject/predicate/object is either bound to a
    /// concrete node or a wildcard. Dispatches to the most selective index
    /// available for the bound combination.
    pub fn find<'a>(
        &'a self,
        subject: Option<&Node>,
        predicate: Option<&Node>,
        object: Option<&Node>,
    ) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        match (subject, predicate, object) {
            (None, None, None) => Box::new(self.iter()),
            (Some(s), None, None) => set_iter(self.by_subject.get(s)),
            (None, Some(p), None) => set_iter(self.by_predicate.get(p)),
            (None, None, Some(o)) => set_iter(self.by_object.get(o)),
            (Some(s), Some(p), None) => self.find_two(
                &self.by_subject_predicate,
                (s.clone(), p.clone()),
                self.by_subject.get(s),
                self.by_predicate.get(p),
            ),
            (Some(s), None, Some(o)) => self.find_two(
                &self.by_subject_object,
                (s.clone(), o.clone()),
                self.by_subject.get(s),
                self.by_object.get(o),
            ),
            (None, Some(p), Some(o)) => self.find_two(
                &self.by_predicate_object,
                (p.clone(), o.clone()),
                self.by_predicate.get(p),
                self.by_object.get(o),
            ),
            (Some(s), Some(p), Some(o)) => {
                let exact = Triple::new(s.clone(), p.clone(), o.clone());
                Box::new(
                    self.triples
                        .get(&exact)
                        .map(|entry| entry.as_ref())
                        .into_iter(),
                )
            }
        }
    }

    fn find_two<'a>(
        &'a self,
        composite: &'a FxHashMap<(Node, Node), TripleSet>,
        key: (Node, Node),
        first: Option<&'a TripleSet>,
        second: Option<&'a TripleSet>,
    ) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        if self.mode == IndexingMode::Full {
            return set_iter(composite.get(&key));
        }
        // No composite index: scan the smaller candidate set and filter on
        // the other bound component.
        let (Some(first), Some(second)) = (first, second) else {
            return Box::new(std::iter::empty());
        };
        let (smaller, larger) = if first.len() <= second.len() {
            (first, second)
        } else {
            (second, first)
        };
        Box::new(
            smaller
                .iter()
                .filter(move |entry| larger.contains(*entry))
                .map(|entry| entry.as_ref()),
        )
    }

    /// Distinct nodes appearing in subject position.
    pub fn subjects(&self) -> impl Iterator<Item = &Node> {
        self.by_subject.keys()
    }

    /// Distinct nodes appearing in predicate position.
    pub fn predicates(&self) -> impl Iterator<Item = &Node> {
        self.by_predicate.keys()
    }

    /// Distinct nodes appearing in object position.
    pub fn objects(&self) -> impl Iterator<Item = &Node> {
        self.by_object.keys()
    }

    /// Validates that every secondary index agrees with the primary set.
    pub fn validate(&self) -> Result<(), StorageError> {
        let expected = self.triples.len();
        for (name, index) in [
            ("subject", &self.by_subject),
            ("predicate", &self.by_predicate),
            ("object", &self.by_object),
        ] {
            let mut total = 0;
            for (key, set) in index {
                for entry in set {
                    if !self.triples.contains(entry.as_ref()) {
                        return Err(CorruptionError::msg(format!(
                            "triple in {name} index but not in primary set"
                        ))
                        .into());
                    }
                    let component = match name {
                        "subject" => &entry.subject,
                        "predicate" => &entry.predicate,
                        _ => &entry.object,
                    };
                    if component != key {
                        return Err(CorruptionError::msg(format!(
                            "triple filed under the wrong {name} key"
                        ))
                        .into());
                    }
                }
                if set.is_empty() {
                    return Err(CorruptionError::msg(format!(
                        "empty entry left behind in {name} index"
                    ))
                    .into());
                }
                total += set.len();
            }
            if total != expected {
                return Err(CorruptionError::msg(format!(
                    "{name} index covers {total} triples, expected {expected}"
                ))
                .into());
            }
        }
        if self.mode == IndexingMode::Full {
            for (name, index) in [
                ("subject-predicate", &self.by_subject_predicate),
                ("subject-object", &self.by_subject_object),
                ("predicate-object", &self.by_predicate_object),
            ] {
                let total: usize = index.values().map(TripleSet::len).sum();
                if total != expected {
                    return Err(CorruptionError::msg(format!(
                        "{name} index covers {total} triples, expected {expected}"
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }
}

impl Default for TripleIndexSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for TripleIndexSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripleIndexSet")
            .field("len", &self.len())
            .field("mode", &self.mode)
            .finish()
    }
}

fn set_iter<'a>(set: Option<&'a TripleSet>) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
    match set {
        Some(set) => Box::new(set.iter().map(|entry| entry.as_ref())),
        None => Box::new(std::iter::empty()),
    }
}

fn remove_from_index(
    index: &mut FxHashMap<Node, TripleSet>,
    key: &Node,
    entry: &Arc<Triple>,
) {
    if let Some(set) = index.get_mut(key) {
        set.remove(entry);
        if set.is_empty() {
            index.remove(key);
        }
    }
}

fn remove_from_pair_index(
    index: &mut FxHashMap<(Node, Node), TripleSet>,
    key: (Node, Node),
    entry: &Arc<Triple>,
) {
    if let Some(set) = index.get_mut(&key) {
        set.remove(entry);
        if set.is_empty() {
            index.remove(&key);
        }
    }
}
