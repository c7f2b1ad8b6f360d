use rdf_loom_model::Triple;
use thiserror::Error;

/// An error raised by graph-level mutation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GraphError {
    /// The graph was constructed read-only.
    #[error("the graph is read-only")]
    ReadOnly,
    /// Only ground triples (no variables) may be stored.
    #[error("cannot store a non-ground triple: {0}")]
    NonGroundTriple(Triple),
}
