use crate::posting::Posting;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    /// Path or URL the text was extracted from.
    pub source: String,
    pub title: Option<String>,
    /// RFC 3339 timestamp of the indexing call.
    pub indexed_at: Option<String>,
}

/// Term -> posting list, plus the highest document id ever indexed.
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    pub postings: HashMap<String, Vec<Posting>>,
    pub last_document_id: DocId,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn append(&mut self, term: &str, posting: Posting) {
        self.postings.entry(term.to_string()).or_default().push(posting);
    }

    pub fn posting_list(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn num_terms(&self) -> usize { self.postings.len() }
}
