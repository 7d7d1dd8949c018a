use crate::config::StoreConfig;
use crate::error::{DecodeError, StoreError};
use crate::index::{DocId, DocMeta, InvertedIndex};
use crate::posting::{decode_posting, encode_posting, Posting};
use crate::store::PostingStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

const POSTINGS_TREE: &str = "postings";
const DOCS_TREE: &str = "docs";
const META_TREE: &str = "meta";
const LAST_ID_KEY: &[u8] = b"last_document_id";

/// Durable posting store on sled.
///
/// Each term maps to a run of records `[u32 LE length][posting wire bytes]`.
/// Appends go through a concatenating merge operator, so a single append never
/// reads the list back.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    postings: sled::Tree,
    docs: sled::Tree,
    meta: sled::Tree,
}

fn concat_merge(_key: &[u8], old: Option<&[u8]>, appended: &[u8]) -> Option<Vec<u8>> {
    let mut value = old.map(<[u8]>::to_vec).unwrap_or_default();
    value.extend_from_slice(appended);
    Some(value)
}

fn frame(posting: &Posting) -> Vec<u8> {
    let body = encode_posting(posting);
    let mut record = Vec::with_capacity(4 + body.len());
    record.extend_from_slice(&(body.len() as u32).to_le_bytes());
    record.extend_from_slice(&body);
    record
}

fn unframe(term: &str, mut bytes: &[u8]) -> Result<Vec<Posting>, StoreError> {
    let corrupt = |source: DecodeError| StoreError::Corrupt { term: term.to_string(), source };
    let mut list = Vec::new();
    while !bytes.is_empty() {
        let truncated = DecodeError::Truncated { expected: list.len() + 1, decoded: list.len() };
        let (len, rest) = bytes.split_first_chunk::<4>().ok_or_else(|| corrupt(truncated.clone()))?;
        let len = u32::from_le_bytes(*len) as usize;
        if rest.len() < len {
            return Err(corrupt(truncated));
        }
        let (body, rest) = rest.split_at(len);
        list.push(decode_posting(body).map_err(corrupt)?);
        bytes = rest;
    }
    Ok(list)
}

impl SledStore {
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .flush_every_ms(config.flush_every_ms)
            .temporary(config.temporary)
            .open()?;
        let postings = db.open_tree(POSTINGS_TREE)?;
        postings.set_merge_operator(concat_merge);
        let docs = db.open_tree(DOCS_TREE)?;
        let meta = db.open_tree(META_TREE)?;
        tracing::debug!(path = %config.path.display(), terms = postings.len(), "opened sled store");
        Ok(Self { db, postings, docs, meta })
    }

    pub fn put_doc_meta(&self, id: DocId, meta: &DocMeta) -> Result<(), StoreError> {
        let bytes = bincode::serialize(meta)?;
        self.docs.insert(id.to_be_bytes(), bytes)?;
        Ok(())
    }

    pub fn doc_meta(&self, id: DocId) -> Result<Option<DocMeta>, StoreError> {
        match self.docs.get(id.to_be_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Every indexed term in byte order.
    pub fn terms(&self) -> Result<Vec<String>, StoreError> {
        self.postings
            .iter()
            .keys()
            .map(|key| Ok(String::from_utf8_lossy(&key?).into_owned()))
            .collect()
    }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    /// Documents with recorded metadata.
    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub async fn flush(&self) -> Result<(), StoreError> {
        self.db.flush_async().await?;
        Ok(())
    }

    /// Decodes every posting list into memory.
    pub fn load_index(&self) -> Result<InvertedIndex, StoreError> {
        let mut index = InvertedIndex::new();
        for entry in self.postings.iter() {
            let (key, value) = entry?;
            let term = String::from_utf8_lossy(&key).into_owned();
            let list = unframe(&term, &value)?;
            index.postings.insert(term, list);
        }
        index.last_document_id = self.read_last_id()?;
        Ok(index)
    }

    /// Reads every posting list; for debugging only.
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(Snapshot::from_index(&self.load_index()?))
    }

    fn read_last_id(&self) -> Result<DocId, StoreError> {
        Ok(self
            .meta
            .get(LAST_ID_KEY)?
            .and_then(|v| <[u8; 4]>::try_from(&*v).ok())
            .map(u32::from_be_bytes)
            .unwrap_or(0))
    }
}

#[async_trait]
impl PostingStore for SledStore {
    async fn last_document_id(&self) -> Result<DocId, StoreError> {
        self.read_last_id()
    }

    async fn set_last_document_id(&self, id: DocId) -> Result<(), StoreError> {
        self.meta.insert(LAST_ID_KEY, id.to_be_bytes().to_vec())?;
        Ok(())
    }

    async fn append_posting(&self, term: &str, posting: Posting) -> Result<(), StoreError> {
        self.postings.merge(term.as_bytes(), frame(&posting))?;
        Ok(())
    }

    async fn is_term_indexed(&self, term: &str) -> Result<bool, StoreError> {
        Ok(self.postings.contains_key(term.as_bytes())?)
    }

    async fn posting_list(&self, term: &str) -> Result<Vec<Posting>, StoreError> {
        match self.postings.get(term.as_bytes())? {
            Some(bytes) => unframe(term, &bytes),
            None => Ok(Vec::new()),
        }
    }
}

/// Human-readable dump of an index. No compatibility guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub last_document_id: DocId,
    pub terms: BTreeMap<String, Vec<SnapshotPosting>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPosting {
    pub file_delta: u32,
    pub positions: Vec<u32>,
    pub frequency: u32,
}

impl From<&Posting> for SnapshotPosting {
    fn from(p: &Posting) -> Self {
        Self { file_delta: p.file_delta, positions: p.positions.clone(), frequency: p.frequency }
    }
}

impl From<&SnapshotPosting> for Posting {
    fn from(p: &SnapshotPosting) -> Self {
        Posting { file_delta: p.file_delta, frequency: p.positions.len() as u32, positions: p.positions.clone() }
    }
}

impl Snapshot {
    pub fn from_index(index: &InvertedIndex) -> Self {
        let terms = index
            .postings
            .iter()
            .map(|(term, list)| (term.clone(), list.iter().map(SnapshotPosting::from).collect()))
            .collect();
        Self { last_document_id: index.last_document_id, terms }
    }

    pub fn into_index(self) -> InvertedIndex {
        let postings = self
            .terms
            .into_iter()
            .map(|(term, list)| (term, list.iter().map(Posting::from).collect()))
            .collect();
        InvertedIndex { postings, last_document_id: self.last_document_id }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        if let Some(dir) = path.as_ref().parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut f = File::create(path)?;
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::from)?;
        f.write_all(json.as_bytes())?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let mut f = File::open(path)?;
        let mut buf = String::new();
        f.read_to_string(&mut buf)?;
        let snapshot = serde_json::from_str(&buf).map_err(std::io::Error::from)?;
        Ok(snapshot)
    }
}
