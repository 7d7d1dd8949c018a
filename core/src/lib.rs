pub mod codec;
pub mod config;
pub mod error;
pub mod index;
pub mod indexer;
pub mod persist;
pub mod posting;
pub mod ranker;
pub mod searcher;
pub mod stemmer;
pub mod store;
pub mod tokenizer;

pub use config::{DuplicateIdPolicy, IndexerConfig, SearchConfig, StoreConfig};
pub use error::{DecodeError, Error, OrderingError, Result, StoreError};
pub use index::{DocId, DocMeta, InvertedIndex};
pub use indexer::{IndexReport, Indexer};
pub use persist::{SledStore, Snapshot};
pub use posting::Posting;
pub use ranker::{Ranker, ScoredDoc};
pub use searcher::{CancelFlag, Searcher};
pub use store::{MemoryStore, PostingStore};
