use searchify_core::posting::document_ids;
use searchify_core::{
    CancelFlag, Error, Indexer, IndexerConfig, MemoryStore, PostingStore, SearchConfig, Searcher,
    SledStore, StoreConfig,
};
use std::sync::Arc;
use tempfile::tempdir;

async fn cat_index() -> (Indexer<MemoryStore>, Searcher<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let indexer = Indexer::new(store.clone(), IndexerConfig::default());
    indexer.index("the cat sat on the mat", 1).await.unwrap();
    indexer.index("the cat ran", 2).await.unwrap();
    (indexer, Searcher::new(store, SearchConfig::default()))
}

#[tokio::test]
async fn scenario_a_cat_postings() {
    let (indexer, _) = cat_index().await;
    let cat = indexer.store().posting_list("cat").await.unwrap();
    assert_eq!(cat.len(), 2);
    assert_eq!(cat.iter().map(|p| p.file_delta).collect::<Vec<_>>(), vec![1, 1]);
    assert_eq!(cat.iter().map(|p| p.frequency).collect::<Vec<_>>(), vec![1, 1]);
    assert_eq!(document_ids(&cat), vec![1, 2]);
}

#[tokio::test]
async fn scenario_b_tied_scores_sort_by_id() {
    let (_, searcher) = cat_index().await;
    assert_eq!(searcher.search("cat").await.unwrap(), vec![1, 2]);
    assert_eq!(searcher.search("CATS!").await.unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn scenario_c_unknown_term_is_empty() {
    let (_, searcher) = cat_index().await;
    assert!(searcher.search("balabala").await.unwrap().is_empty());
    assert!(searcher.search("").await.unwrap().is_empty());
    assert!(searcher.search("the on").await.unwrap().is_empty());
    // unknown terms do not hide known ones
    assert_eq!(searcher.search("balabala mat").await.unwrap(), vec![1]);
}

#[tokio::test]
async fn scenario_d_same_id_twice() {
    let (indexer, _) = cat_index().await;
    indexer.index("the cat ran", 2).await.unwrap();
    assert_eq!(indexer.store().posting_list("cat").await.unwrap().len(), 3);
    assert_eq!(indexer.store().posting_list("ran").await.unwrap().len(), 2);
}

#[tokio::test]
async fn rarer_terms_rank_higher() {
    let store = Arc::new(MemoryStore::new());
    let indexer = Indexer::new(store.clone(), IndexerConfig::default());
    indexer.index("rust compiler borrow checker", 1).await.unwrap();
    indexer.index("rust web server", 2).await.unwrap();
    indexer.index("python web server", 3).await.unwrap();
    indexer.index("rust rust rust macros", 4).await.unwrap();

    let searcher = Searcher::new(store, SearchConfig::default());
    let hits = searcher.search_scored("rust borrow").await.unwrap();
    let ids: Vec<u32> = hits.iter().map(|h| h.doc_id).collect();
    // doc 4: 3 * log2(4/3); doc 1: log2(4/3) + log2(4)
    assert_eq!(ids, vec![1, 4, 2]);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn max_results_truncates() {
    let store = Arc::new(MemoryStore::new());
    let indexer = Indexer::new(store.clone(), IndexerConfig::default());
    for id in 1..=10 {
        indexer.index("shared term", id).await.unwrap();
    }
    let searcher = Searcher::new(store, SearchConfig { max_results: Some(3) });
    assert_eq!(searcher.search("shared").await.unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn cancelled_search_reports_cancellation() {
    let (_, searcher) = cat_index().await;
    let cancel = CancelFlag::new();
    cancel.cancel();
    let err = searcher.search_with_cancel("cat", &cancel).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn concurrent_queries_share_a_store() {
    let (_, searcher) = cat_index().await;
    let searcher = Arc::new(searcher);
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let s = searcher.clone();
            tokio::spawn(async move { s.search(if i % 2 == 0 { "cat" } else { "mat" }).await })
        })
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        let ids = h.await.unwrap().unwrap();
        assert_eq!(ids, if i % 2 == 0 { vec![1, 2] } else { vec![1] });
    }
}

#[tokio::test]
async fn sled_backed_engine_end_to_end() {
    let dir = tempdir().unwrap();
    let store = Arc::new(SledStore::open(&StoreConfig::new(dir.path().join("index"))).unwrap());
    let indexer = Indexer::new(store.clone(), IndexerConfig::default());
    indexer.index("finite state machines", 1).await.unwrap();
    indexer.index("state of the art search", 2).await.unwrap();
    indexer.index("regular languages and finite automata", 3).await.unwrap();

    let searcher = Searcher::new(store.clone(), SearchConfig::default());
    let ids = searcher.search("finite state machines").await.unwrap();
    assert_eq!(ids[0], 1);
    assert_eq!(ids.len(), 3);

    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.last_document_id, 3);
    assert_eq!(snapshot.terms["finit"].len(), 2);
    assert_eq!(snapshot.terms["finit"][1].file_delta, 2);
}
