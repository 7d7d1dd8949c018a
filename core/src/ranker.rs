use crate::index::DocId;
use crate::posting::Posting;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// TF-IDF with raw term frequency and a base-2 idf over the highest indexed id.
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    last_document_id: DocId,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

impl Ranker {
    pub fn new(last_document_id: DocId) -> Self { Self { last_document_id } }

    /// `document_frequency` is the length of the term's posting list.
    pub fn idf(&self, document_frequency: usize) -> f64 {
        if document_frequency == 0 {
            return 0.0;
        }
        (f64::from(self.last_document_id) / document_frequency as f64).log2()
    }

    pub fn score(&self, posting: &Posting, document_frequency: usize) -> f64 {
        f64::from(posting.frequency) * self.idf(document_frequency)
    }
}

/// Running per-document totals for one query.
#[derive(Debug, Default)]
pub struct ScoreBoard {
    scores: HashMap<DocId, f64>,
}

impl ScoreBoard {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, doc_id: DocId, contribution: f64) {
        *self.scores.entry(doc_id).or_insert(0.0) += contribution;
    }

    /// Highest score first; equal scores in ascending id order.
    pub fn into_ranked(self) -> Vec<ScoredDoc> {
        let mut ranked: Vec<ScoredDoc> =
            self.scores.into_iter().map(|(doc_id, score)| ScoredDoc { doc_id, score }).collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.doc_id.cmp(&b.doc_id))
        });
        ranked
    }
}
