use crate::graph::Graph;
use rdf_loom_model::{GraphName, Quad};
use rustc_hash::FxHashMap;

/// A collection of named graphs plus the always-present default graph.
///
/// Adding a graph under a name that is already taken replaces the previous
/// graph (last-write-wins); there is no merge mode.
#[derive(Debug)]
pub struct GraphStore {
    graphs: FxHashMap<GraphName, Graph>,
}

impl GraphStore {
    /// Creates a store containing an empty default graph.
    pub fn new() -> Self {
        let mut graphs = FxHashMap::default();
        graphs.insert(GraphName::DefaultGraph, Graph::new());
        Self { graphs }
    }

    /// The number of graphs, including the default graph.
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        // the default graph is always present
        false
    }

    pub fn has_graph(&self, name: &GraphName) -> bool {
        self.graphs.contains_key(name)
    }

    /// Adds `graph` under `name`, returning the graph it replaced, if any.
    pub fn add(&mut self, name: GraphName, graph: Graph) -> Option<Graph> {
        tracing::debug!(%name, "graph added to store");
        self.graphs.insert(name, graph)
    }

    /// Removes the graph stored under `name`.
    ///
    /// Removing the default graph yields its current content and leaves a
    /// fresh empty default graph behind, keeping it always addressable.
    pub fn remove(&mut self, name: &GraphName) -> Option<Graph> {
        let removed = self.graphs.remove(name);
        if name.is_default() {
            self.graphs.insert(GraphName::DefaultGraph, Graph::new());
        }
        removed
    }

    pub fn graph(&self, name: &GraphName) -> Option<&Graph> {
        self.graphs.get(name)
    }

    pub fn graph_mut(&mut self, name: &GraphName) -> Option<&mut Graph> {
        self.graphs.get_mut(name)
    }

    pub fn default_graph(&self) -> &Graph {
        self.graphs
            .get(&GraphName::DefaultGraph)
            .unwrap_or_else(|| unreachable!("the default graph is always present"))
    }

    pub fn default_graph_mut(&mut self) -> &mut Graph {
        self.graphs
            .get_mut(&GraphName::DefaultGraph)
            .unwrap_or_else(|| unreachable!("the default graph is always present"))
    }

    pub fn graph_names(&self) -> impl Iterator<Item = &GraphName> {
        self.graphs.keys()
    }

    pub fn graphs(&self) -> impl Iterator<Item = (&GraphName, &Graph)> {
        self.graphs.iter()
    }

    /// All triples of all graphs, decorated with their graph name.
    pub fn quads(&self) -> impl Iterator<Item = Quad> + '_ {
        self.graphs.iter().flat_map(|(name, graph)| {
            graph
                .triples()
                .map(move |triple| Quad::new(triple.clone(), name.clone()))
        })
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
