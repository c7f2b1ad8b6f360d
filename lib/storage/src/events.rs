use rdf_loom_model::Triple;

/// A change to a triple collection, reported synchronously to every
/// registered observer before the mutating call returns.
///
/// Batch operations coalesce into a single event carrying all triples that
/// actually changed; a batch in which nothing changed fires no event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChange {
    Added(Vec<Triple>),
    Removed(Vec<Triple>),
    Cleared,
}

impl CollectionChange {
    /// The number of triples this change reports.
    pub fn len(&self) -> usize {
        match self {
            CollectionChange::Added(triples) | CollectionChange::Removed(triples) => {
                triples.len()
            }
            CollectionChange::Cleared => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A synchronous observer of collection changes.
pub type ChangeObserver = Box<dyn Fn(&CollectionChange) + Send + Sync>;
