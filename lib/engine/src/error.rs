use rdf_loom_model::UriNode;
use std::error::Error;

/// An error that aborts the whole query, as opposed to the row-scoped
/// expression failures that merely exclude a solution.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QueryEvaluationError {
    /// A `SERVICE` node was evaluated without a registered executor.
    #[error("no service executor is registered for endpoint {0}")]
    ServiceUnavailable(UriNode),
    /// The service executor failed.
    #[error("service evaluation against {endpoint} failed")]
    Service {
        endpoint: UriNode,
        #[source]
        source: Box<dyn Error + Send + Sync + 'static>,
    },
}
