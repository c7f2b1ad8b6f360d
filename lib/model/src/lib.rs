mod error;
mod factory;
mod node;
mod numeric;
mod triple;
mod value;
pub mod vocab;

pub use error::*;
pub use factory::*;
pub use node::*;
pub use numeric::*;
pub use triple::*;
pub use value::*;

// Re-export the IRI validation error so callers do not need a direct oxiri
// dependency for matching on it.
pub use oxiri::IriParseError;
