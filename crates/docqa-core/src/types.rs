//! Domain types shared by the store, the language-model client and the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ChunkId = String;

/// Number of leading characters kept in a [`SourcePreview`].
pub const PREVIEW_CHARS: usize = 200;

/// Per-chunk metadata attached during ingestion.
///
/// - `source`: original path to the source file
/// - `filename`: final path component of `source`
/// - `chunk_index`/`total_chunks`: position within the parent document
/// - `file_type`: lower-case extension including the leading dot
/// - `page_number`/`element_type`/`coordinates`: set only for partitioned PDFs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    pub filename: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub file_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<String>,
}

/// Extra metadata carried by a single partitioned element (PDF only).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementMetadata {
    pub element_type: String,
    pub page_number: i32,
    pub coordinates: Option<String>,
}

impl ChunkMetadata {
    pub fn merge_element(&mut self, element: &ElementMetadata) {
        self.element_type = Some(element.element_type.clone());
        self.page_number = Some(element.page_number);
        if element.coordinates.is_some() {
            self.coordinates = element.coordinates.clone();
        }
    }
}

/// An immutable chunk of a source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl Document {
    pub fn new(content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self { content: content.into(), metadata }
    }

    /// Storage key: `doc_{chunk_index}_{first 16 hex chars of blake3(content)}`.
    ///
    /// Identical text at the same position always maps to the same key, so
    /// re-ingesting an unchanged file upserts instead of duplicating rows.
    pub fn id(&self) -> ChunkId {
        let hash = blake3::hash(self.content.as_bytes()).to_hex();
        format!("doc_{}_{}", self.metadata.chunk_index, &hash.as_str()[..16])
    }
}

/// A ranked hit returned by the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub content: String,
    pub metadata: ChunkMetadata,
    /// Always within `[0, 1]`, see [`DistanceMetric::similarity`].
    pub similarity: f32,
}

/// Trimmed view of a search result returned to callers of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePreview {
    pub source: String,
    pub content_preview: String,
    pub similarity: f32,
    pub page: Option<i32>,
}

impl SourcePreview {
    pub fn from_result(result: &SearchResult) -> Self {
        let source = if result.metadata.source.is_empty() {
            "Unknown".to_string()
        } else {
            result.metadata.source.clone()
        };
        Self {
            source,
            content_preview: preview(&result.content),
            similarity: result.similarity,
            page: result.metadata.page_number,
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of `content` followed by `...`.
pub fn preview(content: &str) -> String {
    let mut out: String = content.chars().take(PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}

/// Response envelope produced by the pipeline for a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub answer: String,
    pub sources: Vec<SourcePreview>,
    pub found_results: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub total_documents: usize,
    pub llm_model: String,
    pub embedding_model: String,
    pub llm_connected: bool,
}

/// Distance metric used by the vector store.
///
/// Deserializes through [`FromStr`], so config values accept the same
/// spellings as `parse` and reject unknown names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Dot,
    L2,
}

impl DistanceMetric {
    /// Map a raw distance onto a similarity in `[0, 1]`.
    ///
    /// Cosine and dot distances are `1 - cos`, so `1 - d` is clamped (anti-correlated
    /// vectors score 0). L2 is unbounded and mapped with `1 / (1 + d)`.
    pub fn similarity(self, distance: f32) -> f32 {
        if !distance.is_finite() {
            return 0.0;
        }
        match self {
            DistanceMetric::Cosine | DistanceMetric::Dot => (1.0 - distance).clamp(0.0, 1.0),
            DistanceMetric::L2 => 1.0 / (1.0 + distance.max(0.0)),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "dot" | "ip" => Ok(DistanceMetric::Dot),
            "l2" | "euclidean" => Ok(DistanceMetric::L2),
            other => Err(crate::error::Error::UnknownMetric(other.to_string())),
        }
    }
}

impl TryFrom<String> for DistanceMetric {
    type Error = crate::error::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Dot => "dot",
            DistanceMetric::L2 => "l2",
        };
        f.write_str(s)
    }
}
