use crate::error::StoreError;
use crate::index::{DocId, InvertedIndex};
use crate::posting::Posting;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Backend holding every term's posting list and the last indexed id.
///
/// Every call may suspend. Implementations do not retry failures.
#[async_trait]
pub trait PostingStore: Send + Sync {
    /// 0 when nothing has been indexed.
    async fn last_document_id(&self) -> Result<DocId, StoreError>;

    async fn set_last_document_id(&self, id: DocId) -> Result<(), StoreError>;

    /// Appends to the term's list, creating it on first use.
    async fn append_posting(&self, term: &str, posting: Posting) -> Result<(), StoreError>;

    async fn is_term_indexed(&self, term: &str) -> Result<bool, StoreError>;

    /// Empty when the term was never indexed.
    async fn posting_list(&self, term: &str) -> Result<Vec<Posting>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<InvertedIndex>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn from_index(index: InvertedIndex) -> Self {
        Self { inner: RwLock::new(index) }
    }
}

#[async_trait]
impl PostingStore for MemoryStore {
    async fn last_document_id(&self) -> Result<DocId, StoreError> {
        Ok(self.inner.read().last_document_id)
    }

    async fn set_last_document_id(&self, id: DocId) -> Result<(), StoreError> {
        self.inner.write().last_document_id = id;
        Ok(())
    }

    async fn append_posting(&self, term: &str, posting: Posting) -> Result<(), StoreError> {
        self.inner.write().append(term, posting);
        Ok(())
    }

    async fn is_term_indexed(&self, term: &str) -> Result<bool, StoreError> {
        Ok(self.inner.read().postings.contains_key(term))
    }

    async fn posting_list(&self, term: &str) -> Result<Vec<Posting>, StoreError> {
        Ok(self.inner.read().posting_list(term).to_vec())
    }
}
