use crate::error::QueryEvaluationError;
use rdf_loom_algebra::{Algebra, Solution};
use rdf_loom_model::{Node, Triple, UriNode};
use rdf_loom_storage::{Graph, GraphStore, TripleIndexSet};

/// The engine-facing read contract of a triple store: pattern lookup with
/// each position either bound to a node or a wildcard.
pub trait TripleSource {
    fn find_triples<'a>(
        &'a self,
        subject: Option<&Node>,
        predicate: Option<&Node>,
        object: Option<&Node>,
    ) -> Box<dyn Iterator<Item = &'a Triple> + 'a>;

    /// The distinct nodes occurring in subject or object position, needed by
    /// zero-length path evaluation.
    fn terms(&self) -> Vec<Node> {
        let mut terms: Vec<Node> = Vec::new();
        for triple in self.find_triples(None, None, None) {
            for node in [&triple.subject, &triple.object] {
                if !terms.contains(node) {
                    terms.push(node.clone());
                }
            }
        }
        terms
    }
}

impl TripleSource for TripleIndexSet {
    fn find_triples<'a>(
        &'a self,
        subject: Option<&Node>,
        predicate: Option<&Node>,
        object: Option<&Node>,
    ) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        self.find(subject, predicate, object)
    }
}

impl TripleSource for Graph {
    fn find_triples<'a>(
        &'a self,
        subject: Option<&Node>,
        predicate: Option<&Node>,
        object: Option<&Node>,
    ) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        self.find(subject, predicate, object)
    }
}

/// A graph store is queried through its default graph.
impl TripleSource for GraphStore {
    fn find_triples<'a>(
        &'a self,
        subject: Option<&Node>,
        predicate: Option<&Node>,
        object: Option<&Node>,
    ) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        self.default_graph().find(subject, predicate, object)
    }
}

/// Executes `SERVICE` blocks against an external endpoint. The core ships no
/// network client; callers register an executor when they need federation.
pub trait ServiceExecutor {
    fn execute(
        &self,
        endpoint: &UriNode,
        inner: &Algebra,
    ) -> Result<Vec<Solution>, QueryEvaluationError>;
}

/// Everything an evaluation needs: the triple source plus optional
/// collaborators. Passed down the call chain explicitly; there is no ambient
/// state.
#[derive(Clone, Copy)]
pub struct ExecutionContext<'a> {
    pub source: &'a dyn TripleSource,
    pub service_executor: Option<&'a dyn ServiceExecutor>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(source: &'a dyn TripleSource) -> Self {
        Self {
            source,
            service_executor: None,
        }
    }

    pub fn with_service_executor(
        source: &'a dyn TripleSource,
        service_executor: &'a dyn ServiceExecutor,
    ) -> Self {
        Self {
            source,
            service_executor: Some(service_executor),
        }
    }
}
