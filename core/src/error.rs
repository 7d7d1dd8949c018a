use crate::DocId;
use thiserror::Error;

/// Failure to recover integers from a codec bit stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("bit stream ended after {decoded} of {expected} values")]
    Truncated { expected: usize, decoded: usize },

    #[error("code exceeds the u32 range")]
    Overflow,
}

/// A document id that would break the cumulative delta invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderingError {
    #[error("document id 0 is reserved")]
    ReservedId,

    #[error("document id {document_id} does not follow the last indexed id {last}")]
    NotAfterLastDocument { document_id: DocId, last: DocId },

    #[error("document id {document_id} is below the cumulative id {prior_sum} of term '{term}'")]
    BeforeTermSum {
        term: String,
        document_id: DocId,
        prior_sum: u64,
    },

    #[error("document id {document_id} is already indexed for term '{term}'")]
    Duplicate { term: String, document_id: DocId },

    #[error("no document id left after {last}")]
    IdsExhausted { last: DocId },
}

/// Posting store failures. Never retried by the core.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt posting list for term '{term}': {source}")]
    Corrupt {
        term: String,
        #[source]
        source: DecodeError,
    },
}

/// Main error type for indexing and search operations
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Ordering(#[from] OrderingError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("query cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True when the caller handed the indexer an id that cannot be appended.
    pub fn is_ordering(&self) -> bool {
        matches!(self, Error::Ordering(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::from(OrderingError::NotAfterLastDocument { document_id: 3, last: 7 });
        assert_eq!(err.to_string(), "document id 3 does not follow the last indexed id 7");
        assert!(err.is_ordering());

        let err = Error::from(DecodeError::Truncated { expected: 4, decoded: 1 });
        assert_eq!(err.to_string(), "bit stream ended after 1 of 4 values");
        assert!(!err.is_ordering());
    }

    #[test]
    fn test_corrupt_store_error_keeps_source() {
        let err = StoreError::Corrupt { term: "cat".into(), source: DecodeError::Overflow };
        assert!(err.to_string().contains("'cat'"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
