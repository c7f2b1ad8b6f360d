use crate::context::{ExecutionContext, ServiceExecutor, TripleSource};
use crate::error::QueryEvaluationError;
use crate::eval::evaluate;
use crate::results::{QueryResult, TabularResults};
use rdf_loom_algebra::{DefaultQueryCompiler, Query, QueryCompiler, QueryType, Solution};
use rdf_loom_storage::{Graph, GraphStore};

/// Compiles and executes queries against some data source.
pub trait QueryProcessor {
    fn execute(&self, query: &Query) -> Result<QueryResult, QueryEvaluationError>;
}

fn run_query(
    source: &dyn TripleSource,
    service_executor: Option<&dyn ServiceExecutor>,
    query: &Query,
) -> Result<QueryResult, QueryEvaluationError> {
    let algebra = DefaultQueryCompiler.compile(query);
    tracing::debug!(?query.query_type, "executing compiled query");
    let ctx = ExecutionContext {
        source,
        service_executor,
    };
    let mut solutions = evaluate(&algebra, ctx)?;
    match query.query_type {
        QueryType::Ask => Ok(QueryResult::Boolean(solutions.next().is_some())),
        _ => {
            let rows: Vec<Solution> = solutions.collect();
            let variables: Vec<String> = if query.projections.is_empty() {
                algebra.in_scope_variables()
            } else {
                query
                    .projections
                    .iter()
                    .map(|(name, _)| name.clone())
                    .collect()
            };
            Ok(QueryResult::Tabular(TabularResults::new(variables, rows)))
        }
    }
}

/// Executes queries against a single graph.
#[derive(Debug)]
pub struct GraphQueryProcessor {
    graph: Graph,
}

impl GraphQueryProcessor {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }
}

impl QueryProcessor for GraphQueryProcessor {
    fn execute(&self, query: &Query) -> Result<QueryResult, QueryEvaluationError> {
        run_query(&self.graph, None, query)
    }
}

/// Executes queries against a graph store, reading its default graph.
#[derive(Debug)]
pub struct QuadStoreQueryProcessor {
    store: GraphStore,
}

impl QuadStoreQueryProcessor {
    pub fn new(store: GraphStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn into_store(self) -> GraphStore {
        self.store
    }
}

impl QueryProcessor for QuadStoreQueryProcessor {
    fn execute(&self, query: &Query) -> Result<QueryResult, QueryEvaluationError> {
        run_query(&self.store, None, query)
    }
}

/// A processor with a registered service executor for federated queries.
pub struct FederatingQueryProcessor<S> {
    source: S,
    service_executor: Box<dyn ServiceExecutor>,
}

impl<S: TripleSource> FederatingQueryProcessor<S> {
    pub fn new(source: S, service_executor: Box<dyn ServiceExecutor>) -> Self {
        Self {
            source,
            service_executor,
        }
    }
}

impl<S: TripleSource> QueryProcessor for FederatingQueryProcessor<S> {
    fn execute(&self, query: &Query) -> Result<QueryResult, QueryEvaluationError> {
        run_query(&self.source, Some(self.service_executor.as_ref()), query)
    }
}
