mod bounded;
pub mod error;

pub use bounded::*;
pub use error::*;
