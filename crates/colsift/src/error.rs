use colsift_schema::ResolveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The type resolver rejected a recorded type. Surfaced as-is.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
