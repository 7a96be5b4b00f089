use std::path::{Path, PathBuf};

use docqa_core::config::Config;
use docqa_core::types::{ChunkMetadata, Document, ElementMetadata};

use crate::error::{IngestError, Result};
use crate::extract;
use crate::partition::{PartitionClient, PartitionSettings};
use crate::splitter::{RecursiveCharacterSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

pub const SUPPORTED_EXTENSIONS: [&str; 4] = [".pdf", ".docx", ".txt", ".md"];

/// Lower-case extension including the leading dot, or empty.
pub fn file_type(path: &Path) -> String {
    path.extension().map(|e| format!(".{}", e.to_string_lossy().to_lowercase())).unwrap_or_default()
}

pub fn is_supported(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&file_type(path).as_str())
}

/// Turns files into chunked [`Document`]s ready for the store.
pub struct DocumentProcessor {
    splitter: RecursiveCharacterSplitter,
    partitioner: PartitionClient,
}

impl DocumentProcessor {
    pub fn new(splitter: RecursiveCharacterSplitter, partitioner: PartitionClient) -> Self {
        Self { splitter, partitioner }
    }

    /// `processing.chunk_size`, `processing.chunk_overlap` and `unstructured.*`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let splitter = RecursiveCharacterSplitter::new(
            config.get_or("processing.chunk_size", DEFAULT_CHUNK_SIZE),
            config.get_or("processing.chunk_overlap", DEFAULT_CHUNK_OVERLAP),
        );
        let partitioner = PartitionClient::new(PartitionSettings::from_config(config))?;
        Ok(Self::new(splitter, partitioner))
    }

    /// Chunks for one file. Missing, unsupported or unreadable files yield an empty list.
    pub async fn process_document(&self, path: &Path) -> Vec<Document> {
        match self.try_process_document(path).await {
            Ok(docs) => docs,
            Err(IngestError::NotFound(p)) => {
                tracing::warn!(path = %p.display(), "file not found");
                Vec::new()
            }
            Err(IngestError::UnsupportedFileType(ext)) => {
                tracing::warn!(path = %path.display(), ext = %ext, "unsupported file type");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "text extraction failed");
                Vec::new()
            }
        }
    }

    pub async fn try_process_document(&self, path: &Path) -> Result<Vec<Document>> {
        if !path.exists() {
            return Err(IngestError::NotFound(path.to_path_buf()));
        }
        let file_name =
            path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        tracing::info!(file = %file_name, "processing");

        let ext = file_type(path);
        let (text, elements) = match ext.as_str() {
            ".pdf" => {
                let parsed = self.partitioner.partition(path).await?;
                tracing::info!(file = %file_name, elements = parsed.elements.len(), "partitioned");
                (parsed.text, parsed.elements)
            }
            ".docx" => (extract::read_docx(path)?, Vec::new()),
            ".txt" | ".md" => (extract::read_text(path)?, Vec::new()),
            _ => return Err(IngestError::UnsupportedFileType(ext)),
        };

        if text.trim().is_empty() {
            tracing::warn!(file = %file_name, "no text extracted");
            return Ok(Vec::new());
        }

        let docs = self.chunk(path, &file_name, &ext, &text, &elements);
        tracing::info!(file = %file_name, chunks = docs.len(), "created chunks");
        Ok(docs)
    }

    fn chunk(
        &self,
        path: &Path,
        file_name: &str,
        ext: &str,
        text: &str,
        elements: &[ElementMetadata],
    ) -> Vec<Document> {
        let chunks = self.splitter.split_text(text);
        let total_chunks = chunks.len();
        chunks
            .into_iter()
            .enumerate()
            .filter(|(_, chunk)| !chunk.trim().is_empty())
            .map(|(i, chunk)| {
                let mut metadata = ChunkMetadata {
                    source: path.to_string_lossy().into_owned(),
                    filename: file_name.to_string(),
                    chunk_index: i,
                    total_chunks,
                    file_type: ext.to_string(),
                    ..Default::default()
                };
                // Positional pairing: chunk i takes element i's metadata when it exists.
                if let Some(element) = elements.get(i) {
                    metadata.merge_element(element);
                }
                Document::new(chunk, metadata)
            })
            .collect()
    }

    /// Every supported file under `dir`, in sorted path order.
    pub fn list_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_supported(p))
            .collect();
        files.sort();
        files
    }

    pub async fn process_directory(&self, dir: &Path) -> Vec<Document> {
        let files = self.list_files(dir);
        if files.is_empty() {
            tracing::warn!(dir = %dir.display(), "no supported files found");
            return Vec::new();
        }
        let mut all = Vec::new();
        for (n, path) in files.iter().enumerate() {
            tracing::info!("Processing file {}/{}: {}", n + 1, files.len(), path.display());
            all.extend(self.process_document(path).await);
        }
        tracing::info!(files = files.len(), chunks = all.len(), "processed directory");
        all
    }
}
