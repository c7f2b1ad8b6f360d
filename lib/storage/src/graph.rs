use crate::collection::{IndexingMode, TripleIndexSet};
use crate::error::GraphError;
use crate::events::ChangeObserver;
use crate::namespaces::NamespaceMap;
use rdf_loom_model::{
    GraphName, IriParseError, Node, NodeFactory, Quad, SimpleNodeFactory, Triple,
    UriNode,
};
use uuid::Uuid;

/// What a graph instance supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphCapabilities {
    pub read_only: bool,
    pub supports_events: bool,
    /// Mutating the underlying collection while an iterator is open is
    /// statically rejected by the borrow checker, so this is always `false`.
    pub modify_during_iteration: bool,
}

impl Default for GraphCapabilities {
    fn default() -> Self {
        Self {
            read_only: false,
            supports_events: true,
            modify_during_iteration: false,
        }
    }
}

/// A named collection of triples: a [TripleIndexSet] together with a
/// namespace map, an attached node factory and a capability descriptor.
///
/// A graph owns its collection exclusively. Graphs compare by identity only;
/// there is deliberately no `PartialEq`.
#[derive(Debug)]
pub struct Graph {
    triples: TripleIndexSet,
    namespaces: NamespaceMap,
    factory: SimpleNodeFactory,
    capabilities: GraphCapabilities,
}

impl Graph {
    pub fn new() -> Self {
        Self::with_collection(TripleIndexSet::new())
    }

    pub fn with_mode(mode: IndexingMode) -> Self {
        Self::with_collection(TripleIndexSet::with_mode(mode))
    }

    pub fn with_collection(triples: TripleIndexSet) -> Self {
        Self {
            triples,
            namespaces: NamespaceMap::new(),
            factory: SimpleNodeFactory::new(),
            capabilities: GraphCapabilities::default(),
        }
    }

    /// Makes this graph reject all future mutation.
    pub fn into_read_only(mut self) -> Self {
        self.capabilities.read_only = true;
        self
    }

    pub fn capabilities(&self) -> GraphCapabilities {
        self.capabilities
    }

    pub fn namespaces(&self) -> &NamespaceMap {
        &self.namespaces
    }

    pub fn namespaces_mut(&mut self) -> &mut NamespaceMap {
        &mut self.namespaces
    }

    pub fn factory(&self) -> &SimpleNodeFactory {
        &self.factory
    }

    pub fn count(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    fn check_writable(&self) -> Result<(), GraphError> {
        if self.capabilities.read_only {
            return Err(GraphError::ReadOnly);
        }
        Ok(())
    }

    fn check_ground(triple: &Triple) -> Result<(), GraphError> {
        if !triple.is_ground() {
            return Err(GraphError::NonGroundTriple(triple.clone()));
        }
        Ok(())
    }

    /// Asserts a triple. Returns `false` if it was already present.
    pub fn assert(&mut self, triple: Triple) -> Result<bool, GraphError> {
        self.check_writable()?;
        Self::check_ground(&triple)?;
        Ok(self.triples.add(triple))
    }

    /// Asserts a batch of triples with a single coalesced change
    /// notification. Returns the number actually added.
    pub fn assert_all(
        &mut self,
        triples: impl IntoIterator<Item = Triple>,
    ) -> Result<usize, GraphError> {
        self.check_writable()?;
        let triples: Vec<Triple> = triples.into_iter().collect();
        for triple in &triples {
            Self::check_ground(triple)?;
        }
        Ok(self.triples.add_all(triples))
    }

    /// Retracts a triple. Returns `false` if it was absent.
    pub fn retract(&mut self, triple: &Triple) -> Result<bool, GraphError> {
        self.check_writable()?;
        Ok(self.triples.remove(triple))
    }

    /// Retracts a batch of triples with a single coalesced change
    /// notification. Returns the number actually removed.
    pub fn retract_all<'a>(
        &mut self,
        triples: impl IntoIterator<Item = &'a Triple>,
    ) -> Result<usize, GraphError> {
        self.check_writable()?;
        Ok(self.triples.remove_all(triples))
    }

    pub fn clear(&mut self) -> Result<(), GraphError> {
        self.check_writable()?;
        self.triples.clear();
        Ok(())
    }

    pub fn find<'a>(
        &'a self,
        subject: Option<&Node>,
        predicate: Option<&Node>,
        object: Option<&Node>,
    ) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        self.triples.find(subject, predicate, object)
    }

    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// The triples of this graph decorated with the default graph name.
    pub fn quads(&self) -> impl Iterator<Item = Quad> + '_ {
        self.triples
            .iter()
            .map(|triple| Quad::new(triple.clone(), GraphName::DefaultGraph))
    }

    /// Distinct nodes appearing in subject or object position.
    pub fn vertices(&self) -> Vec<&Node> {
        let mut vertices: Vec<&Node> = self.triples.subjects().collect();
        for node in self.triples.objects() {
            if !vertices.contains(&node) {
                vertices.push(node);
            }
        }
        vertices
    }

    /// Distinct nodes appearing in predicate position.
    pub fn edges(&self) -> Vec<&Node> {
        self.triples.predicates().collect()
    }

    /// Registers a change observer on the underlying collection.
    pub fn on_change(&mut self, observer: ChangeObserver) {
        self.triples.on_change(observer);
    }

    // Node creation, delegated to the attached factory. Anonymous blank
    // nodes and graph literals are scoped to this graph's factory.

    pub fn create_uri_node(&self, uri: &str) -> Result<Node, IriParseError> {
        self.factory.create_uri_node(uri)
    }

    pub fn create_blank_node(&self) -> Node {
        self.factory.create_blank_node()
    }

    pub fn create_blank_node_with_id(&self, id: Uuid) -> Node {
        self.factory.create_blank_node_with_id(id)
    }

    pub fn create_literal_node(&self, value: &str) -> Node {
        self.factory.create_literal_node(value)
    }

    pub fn create_literal_node_with_language(&self, value: &str, language: &str) -> Node {
        self.factory.create_literal_node_with_language(value, language)
    }

    pub fn create_literal_node_with_datatype(
        &self,
        value: &str,
        datatype: UriNode,
    ) -> Node {
        self.factory.create_literal_node_with_datatype(value, datatype)
    }

    pub fn create_variable_node(&self, name: &str) -> Node {
        self.factory.create_variable_node(name)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
