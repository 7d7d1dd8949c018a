use crate::config::{DuplicateIdPolicy, IndexerConfig};
use crate::error::{OrderingError, Result};
use crate::index::DocId;
use crate::posting::{cumulative_sum, Posting};
use crate::store::PostingStore;
use crate::tokenizer::tokenize;
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub document_id: DocId,
    /// Tokens left after stop-word removal.
    pub tokens: usize,
    /// Distinct terms, i.e. postings appended.
    pub terms: usize,
}

/// Sole writer of the posting store.
///
/// Appending needs the term's cumulative id first, so every `index` call holds
/// one lock from that read until the last append.
pub struct Indexer<S: ?Sized> {
    store: Arc<S>,
    config: IndexerConfig,
    write_lock: Mutex<()>,
}

/// 1-based positions of each term in the token sequence.
pub fn term_positions(tokens: &[String]) -> BTreeMap<&str, Vec<u32>> {
    let mut map: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for (i, token) in tokens.iter().enumerate() {
        map.entry(token.as_str()).or_default().push(i as u32 + 1);
    }
    map
}

impl<S: PostingStore + ?Sized> Indexer<S> {
    pub fn new(store: Arc<S>, config: IndexerConfig) -> Self {
        Self { store, config, write_lock: Mutex::new(()) }
    }

    pub fn store(&self) -> &Arc<S> { &self.store }

    /// Appends one posting per distinct term of `text` for `document_id`.
    ///
    /// Ids must not go backwards. Every ordering check runs before the first
    /// append, so a rejected document leaves the store untouched.
    pub async fn index(&self, text: &str, document_id: DocId) -> Result<IndexReport> {
        let _guard = self.write_lock.lock().await;
        self.index_locked(text, document_id).await
    }

    /// Indexes `text` under `last_document_id + 1`, read under the same lock.
    pub async fn index_next(&self, text: &str) -> Result<IndexReport> {
        let _guard = self.write_lock.lock().await;
        let last = self.store.last_document_id().await?;
        let document_id = last.checked_add(1).ok_or(OrderingError::IdsExhausted { last })?;
        self.index_locked(text, document_id).await
    }

    async fn index_locked(&self, text: &str, document_id: DocId) -> Result<IndexReport> {
        if document_id == 0 {
            return Err(OrderingError::ReservedId.into());
        }
        let last = self.store.last_document_id().await?;
        let repeat_rejected = self.config.duplicate_ids == DuplicateIdPolicy::Reject;
        if document_id < last || (document_id == last && repeat_rejected) {
            return Err(OrderingError::NotAfterLastDocument { document_id, last }.into());
        }

        let tokens = tokenize(text);
        let positions = term_positions(&tokens);
        let lists = try_join_all(positions.keys().map(|term| self.store.posting_list(term))).await?;

        let id = u64::from(document_id);
        let mut pending = Vec::with_capacity(positions.len());
        for ((term, occurrences), list) in positions.iter().zip(&lists) {
            let prior_sum = cumulative_sum(list);
            if id < prior_sum {
                return Err(OrderingError::BeforeTermSum {
                    term: term.to_string(),
                    document_id,
                    prior_sum,
                }
                .into());
            }
            if id == prior_sum && !list.is_empty() && repeat_rejected {
                return Err(OrderingError::Duplicate { term: term.to_string(), document_id }.into());
            }
            // id - prior_sum <= id, so it fits
            let posting = Posting::from_positions((id - prior_sum) as u32, occurrences);
            pending.push((*term, posting));
        }

        for (term, posting) in pending {
            tracing::trace!(term, file_delta = posting.file_delta, frequency = posting.frequency, "append posting");
            self.store.append_posting(term, posting).await?;
        }
        if document_id > last {
            self.store.set_last_document_id(document_id).await?;
        }

        tracing::info!(document_id, tokens = tokens.len(), terms = positions.len(), "indexed document");
        Ok(IndexReport { document_id, tokens: tokens.len(), terms: positions.len() })
    }
}
