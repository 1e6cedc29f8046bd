/// Failures surfaced by a storage collaborator.
///
/// A `Transient` failure is retryable by the caller; none of the engines
/// retry internally, and a failed lookup is never treated as "no record".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage collaborator unavailable: {0}")]
    Transient(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}
