//! An in-memory RDF graph store and SPARQL query engine.
//!
//! The crate is split into layers, re-exported here as one surface:
//!
//! - `rdf-loom-model`: RDF terms ([Node], [Triple], [Quad]) and the node
//!   factory contract;
//! - `rdf-loom-storage`: the indexed triple collection, [Graph] and
//!   [GraphStore];
//! - `rdf-loom-algebra`: the query element tree, the SPARQL algebra and the
//!   query compiler;
//! - `rdf-loom-engine`: the pull-based execution engine and query
//!   processors.
//!
//! ```
//! use rdf_loom::{
//!     Element, Graph, GraphQueryProcessor, Query, QueryProcessor, QueryType,
//!     Triple,
//! };
//!
//! let mut graph = Graph::new();
//! let s = graph.create_uri_node("http://example.org/s")?;
//! let p = graph.create_uri_node("http://example.org/p")?;
//! let o = graph.create_literal_node("1");
//! graph.assert(Triple::new(s.clone(), p.clone(), o))?;
//!
//! let mut query = Query::new();
//! query.query_type = QueryType::Ask;
//! query.where_clause = Some(Element::TripleBlock(vec![Triple::new(
//!     s,
//!     p,
//!     graph.create_variable_node("o"),
//! )]));
//!
//! let processor = GraphQueryProcessor::new(graph);
//! let result = processor.execute(&query)?;
//! assert_eq!(result.as_boolean(), Some(true));
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

pub use rdf_loom_algebra::*;
pub use rdf_loom_common::*;
pub use rdf_loom_engine::*;
pub use rdf_loom_model::*;
pub use rdf_loom_storage::*;
