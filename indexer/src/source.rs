//! Turns paths and URLs into plain text for the indexer.

use reqwest::{header, Client};
use scraper::{Html, Selector};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid document JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("{url} is larger than {MAX_BODY_BYTES} bytes")]
    TooLarge { url: String },

    #[error("unsupported document type: {0}")]
    Unsupported(PathBuf),
}

/// Plain text of one document plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDoc {
    pub source: String,
    pub title: Option<String>,
    pub text: String,
}

/// One record of a `.json` array/object or a `.jsonl` line.
#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    #[serde(default)]
    title: Option<String>,
    body: String,
    #[serde(default)]
    url: Option<String>,
}

impl From<InputDoc> for ExtractedDoc {
    fn from(doc: InputDoc) -> Self {
        Self { source: doc.url.unwrap_or(doc.id), title: doc.title, text: doc.body }
    }
}

pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn extension(path: &Path) -> Option<String> {
    path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase)
}

pub fn is_supported(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("txt" | "md" | "html" | "htm" | "json" | "jsonl"))
}

/// Supported files under `input` in path order, so ids are stable between runs.
pub fn collect_files(input: &Path) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_supported(p))
        .collect();
    files.sort();
    files
}

/// Title and visible body text of an HTML page.
pub fn html_to_text(html: &str) -> (Option<String>, String) {
    let doc = Html::parse_document(html);
    let sel_title = Selector::parse("title").expect("valid selector");
    let sel_body = Selector::parse("body").expect("valid selector");
    let sel_skip = Selector::parse("script, style, noscript").expect("valid selector");

    let title = doc
        .select(&sel_title)
        .next()
        .map(|n| n.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    let skipped: Vec<_> = doc.select(&sel_skip).map(|n| n.id()).collect();
    let root = doc.select(&sel_body).next().unwrap_or_else(|| doc.root_element());
    let mut text = String::new();
    for node in root.descendants() {
        let Some(chunk) = node.value().as_text() else { continue };
        if node.ancestors().any(|a| skipped.contains(&a.id())) {
            continue;
        }
        text.push_str(chunk);
        text.push(' ');
    }
    (title, text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Reads a local file. JSON files can hold several documents.
pub fn read_path(path: &Path) -> Result<Vec<ExtractedDoc>, ExtractionError> {
    let io_err = |source| ExtractionError::Io { path: path.to_path_buf(), source };
    let json_err = |source| ExtractionError::Json { path: path.to_path_buf(), source };
    let source = path.display().to_string();

    match extension(path).as_deref() {
        Some("txt" | "md") => {
            let text = fs::read_to_string(path).map_err(io_err)?;
            Ok(vec![ExtractedDoc { source, title: None, text }])
        }
        Some("html" | "htm") => {
            let html = fs::read_to_string(path).map_err(io_err)?;
            let (title, text) = html_to_text(&html);
            Ok(vec![ExtractedDoc { source, title, text }])
        }
        Some("jsonl") => {
            let reader = BufReader::new(File::open(path).map_err(io_err)?);
            let mut docs = Vec::new();
            for line in reader.lines() {
                let line = line.map_err(io_err)?;
                if line.trim().is_empty() {
                    continue;
                }
                let doc: InputDoc = serde_json::from_str(&line).map_err(json_err)?;
                docs.push(doc.into());
            }
            Ok(docs)
        }
        Some("json") => {
            let reader = BufReader::new(File::open(path).map_err(io_err)?);
            let json: serde_json::Value = serde_json::from_reader(reader).map_err(json_err)?;
            match json {
                serde_json::Value::Array(arr) => arr
                    .into_iter()
                    .map(|v| serde_json::from_value::<InputDoc>(v).map(Into::into).map_err(json_err))
                    .collect(),
                other => {
                    let doc: InputDoc = serde_json::from_value(other).map_err(json_err)?;
                    Ok(vec![doc.into()])
                }
            }
        }
        _ => Err(ExtractionError::Unsupported(path.to_path_buf())),
    }
}

/// Downloads a page; HTML is reduced to text, anything textual is kept as-is.
pub async fn fetch_url(client: &Client, url: &str) -> Result<ExtractedDoc, ExtractionError> {
    let http_err = |source| ExtractionError::Http { url: url.to_string(), source };
    let resp = client.get(url).send().await.map_err(http_err)?;
    if !resp.status().is_success() {
        return Err(ExtractionError::Status { url: url.to_string(), status: resp.status().as_u16() });
    }
    let is_html = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(true, |v| v.starts_with("text/html"));
    let bytes = resp.bytes().await.map_err(http_err)?;
    if bytes.len() > MAX_BODY_BYTES {
        return Err(ExtractionError::TooLarge { url: url.to_string() });
    }
    let body = String::from_utf8_lossy(&bytes);
    let (title, text) = if is_html { html_to_text(&body) } else { (None, body.into_owned()) };
    Ok(ExtractedDoc { source: url.to_string(), title, text })
}

/// Fetches a URL or reads a local path.
pub async fn extract(client: &Client, location: &str) -> Result<Vec<ExtractedDoc>, ExtractionError> {
    if is_url(location) {
        Ok(vec![fetch_url(client, location).await?])
    } else {
        read_path(Path::new(location))
    }
}
