use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::index::DocId;
use crate::posting::Posting;
use crate::ranker::{Ranker, ScoreBoard, ScoredDoc};
use crate::store::PostingStore;
use crate::tokenizer::distinct_terms;
use futures::future::try_join_all;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Shared flag a caller flips to stop a running merge.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self { Self::default() }

    pub fn cancel(&self) { self.0.store(true, AtomicOrdering::Relaxed) }

    pub fn is_cancelled(&self) -> bool { self.0.load(AtomicOrdering::Relaxed) }
}

/// Cursor into one query term's posting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueryPointer {
    term: usize,
    list_index: usize,
    absolute_doc_id: DocId,
}

impl Ord for QueryPointer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.absolute_doc_id, self.term, self.list_index).cmp(&(
            other.absolute_doc_id,
            other.term,
            other.list_index,
        ))
    }
}

impl PartialOrd for QueryPointer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl QueryPointer {
    fn start(term: usize, list: &[Posting]) -> Option<Self> {
        let first = list.first()?;
        Some(Self { term, list_index: 0, absolute_doc_id: first.file_delta })
    }

    /// Next posting of the same list, or `None` once the list is exhausted.
    fn advance(&self, list: &[Posting]) -> Option<Self> {
        let next = list.get(self.list_index + 1)?;
        Some(Self {
            term: self.term,
            list_index: self.list_index + 1,
            absolute_doc_id: self.absolute_doc_id.saturating_add(next.file_delta),
        })
    }
}

/// Merges the posting lists of all query terms in document id order and
/// scores every document that matches at least one of them.
pub fn merge_and_rank(
    lists: &[Vec<Posting>],
    ranker: &Ranker,
    cancel: Option<&CancelFlag>,
) -> Result<Vec<ScoredDoc>> {
    let mut heap: BinaryHeap<Reverse<QueryPointer>> = lists
        .iter()
        .enumerate()
        .filter_map(|(term, list)| QueryPointer::start(term, list))
        .map(Reverse)
        .collect();
    let mut board = ScoreBoard::new();
    let mut batch = Vec::with_capacity(lists.len());

    while let Some(Reverse(head)) = heap.pop() {
        if cancel.is_some_and(CancelFlag::is_cancelled) {
            return Err(Error::Cancelled);
        }
        batch.clear();
        batch.push(head);
        while let Some(Reverse(p)) = heap.peek() {
            if p.absolute_doc_id != head.absolute_doc_id {
                break;
            }
            batch.push(*p);
            heap.pop();
        }

        for p in &batch {
            let list = &lists[p.term];
            board.add(p.absolute_doc_id, ranker.score(&list[p.list_index], list.len()));
        }
        for p in &batch {
            if let Some(next) = p.advance(&lists[p.term]) {
                heap.push(Reverse(next));
            }
        }
    }
    Ok(board.into_ranked())
}

/// Query engine over a posting store. Reads only.
pub struct Searcher<S: ?Sized> {
    store: Arc<S>,
    config: SearchConfig,
}

impl<S: PostingStore + ?Sized> Searcher<S> {
    pub fn new(store: Arc<S>, config: SearchConfig) -> Self { Self { store, config } }

    /// Matching document ids, best first.
    pub async fn search(&self, query: &str) -> Result<Vec<DocId>> {
        Ok(self.search_scored(query).await?.into_iter().map(|d| d.doc_id).collect())
    }

    pub async fn search_scored(&self, query: &str) -> Result<Vec<ScoredDoc>> {
        self.run(query, None).await
    }

    /// Like `search_scored`, but stops between merge steps once `cancel` is set.
    pub async fn search_with_cancel(&self, query: &str, cancel: &CancelFlag) -> Result<Vec<ScoredDoc>> {
        self.run(query, Some(cancel)).await
    }

    async fn run(&self, query: &str, cancel: Option<&CancelFlag>) -> Result<Vec<ScoredDoc>> {
        let terms = distinct_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        // each list is read on its own; no snapshot across terms
        let (last_document_id, lists) = futures::try_join!(
            self.store.last_document_id(),
            try_join_all(terms.iter().map(|term| self.store.posting_list(term))),
        )?;

        let ranker = Ranker::new(last_document_id);
        let mut ranked = merge_and_rank(&lists, &ranker, cancel)?;
        if let Some(limit) = self.config.max_results {
            ranked.truncate(limit);
        }
        tracing::debug!(query, terms = terms.len(), hits = ranked.len(), "query evaluated");
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(ids: &[DocId], freq: u32) -> Vec<Posting> {
        let mut prev = 0;
        ids.iter()
            .map(|&id| {
                let positions: Vec<u32> = (1..=freq).collect();
                let p = Posting::from_positions(id - prev, &positions);
                prev = id;
                p
            })
            .collect()
    }

    #[test]
    fn pointer_advance_stops_at_end() {
        let l = list(&[2, 5], 1);
        let p = QueryPointer::start(0, &l).unwrap();
        assert_eq!(p.absolute_doc_id, 2);
        let p = p.advance(&l).unwrap();
        assert_eq!(p.absolute_doc_id, 5);
        assert!(p.advance(&l).is_none());
        assert!(QueryPointer::start(0, &[]).is_none());
    }

    #[test]
    fn union_of_terms_is_returned() {
        let lists = vec![list(&[1, 4], 1), list(&[2, 4], 1), Vec::new()];
        let ranked = merge_and_rank(&lists, &Ranker::new(8), None).unwrap();
        let ids: Vec<DocId> = ranked.iter().map(|d| d.doc_id).collect();
        // doc 4 matches both terms: 2 + 2
        assert_eq!(ids, vec![4, 1, 2]);
        assert_eq!(ranked[0].score, 4.0);
        assert_eq!(ranked[1].score, 2.0);
    }

    #[test]
    fn frequency_raises_score() {
        let lists = vec![list(&[1], 1), list(&[2], 3)];
        let ranked = merge_and_rank(&lists, &Ranker::new(4), None).unwrap();
        assert_eq!(ranked[0].doc_id, 2);
    }

    #[test]
    fn repeated_id_in_one_list_accumulates() {
        // same document indexed twice for a term
        let lists = vec![vec![Posting::from_positions(3, &[1]), Posting::from_positions(0, &[1])]];
        let ranked = merge_and_rank(&lists, &Ranker::new(8), None).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].doc_id, 3);
        assert_eq!(ranked[0].score, 4.0);
    }

    #[test]
    fn cancelled_merge_stops() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let lists = vec![list(&[1, 2, 3], 1)];
        assert!(matches!(
            merge_and_rank(&lists, &Ranker::new(3), Some(&cancel)),
            Err(Error::Cancelled)
        ));
    }

    #[test]
    fn no_lists_no_results() {
        assert!(merge_and_rank(&[], &Ranker::new(3), None).unwrap().is_empty());
    }
}
