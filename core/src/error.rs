use thiserror::Error;

/// Reasons a batch is rejected by [`crate::RetrievalIndex::load`].
///
/// `position` is the zero-based offset of the offending record in the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("record at position {position} has no id")]
    MissingId { position: usize },
    #[error("record '{id}' at position {position} has no body text")]
    MissingBody { id: String, position: usize },
}
