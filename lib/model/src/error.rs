use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A light-weight result, mainly used for SPARQL operations.
pub type ThinResult<T> = Result<T, ThinError>;

/// A thin error type that indicates an *expected* failure without any reason.
///
/// Many SPARQL operations can fail, for example because an input value had a
/// different data type. These errors are part of normal query evaluation and
/// are all treated equally (the offending solution is dropped), so no reason
/// needs to be stored.
#[derive(Clone, Copy, Debug, Default, Error, PartialEq, Eq)]
pub struct ThinError {}

impl ThinError {
    /// Creates a result with a [ThinError].
    pub fn expected<T>() -> ThinResult<T> {
        Err(ThinError::default())
    }
}

impl Display for ThinError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("An expected error occurred.")
    }
}

/// Lifts `Option` into [ThinResult].
pub trait ThinOptionExt<T> {
    fn ok_or_thin(self) -> ThinResult<T>;
}

impl<T> ThinOptionExt<T> for Option<T> {
    fn ok_or_thin(self) -> ThinResult<T> {
        match self {
            Some(value) => Ok(value),
            None => ThinError::expected(),
        }
    }
}
