//! docqa-ingest
//!
//! File discovery, text extraction and chunking. PDFs go through the hosted
//! partition API, DOCX is read from its XML body, text and markdown are read
//! directly. Extracted text is cut by [`RecursiveCharacterSplitter`] and each
//! chunk carries its source metadata into the store.

use std::path::Path;

use anyhow::Context;

use docqa_core::traits::DocumentStore;

pub mod error;
pub mod extract;
pub mod partition;
pub mod processor;
pub mod splitter;

pub use error::IngestError;
pub use partition::{PartitionClient, PartitionSettings, Partitioned};
pub use processor::{DocumentProcessor, SUPPORTED_EXTENSIONS};
pub use splitter::RecursiveCharacterSplitter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub chunks_processed: usize,
    pub total_in_store: usize,
}

/// Process every supported file under `docs_dir` and add the chunks to `store`.
pub async fn ingest_directory<S>(
    processor: &DocumentProcessor,
    docs_dir: &Path,
    store: &S,
) -> anyhow::Result<IngestReport>
where
    S: DocumentStore + ?Sized,
{
    std::fs::create_dir_all(docs_dir).with_context(|| format!("creating {}", docs_dir.display()))?;
    tracing::info!(dir = %docs_dir.display(), "ingesting documents");

    let docs = processor.process_directory(docs_dir).await;
    if docs.is_empty() {
        tracing::warn!(dir = %docs_dir.display(), "no documents were processed");
        return Ok(IngestReport { chunks_processed: 0, total_in_store: store.count().await });
    }

    store.store(&docs).await.context("storing document chunks")?;
    let report = IngestReport { chunks_processed: docs.len(), total_in_store: store.count().await };
    tracing::info!(
        chunks = report.chunks_processed,
        total = report.total_in_store,
        "ingestion complete"
    );
    Ok(report)
}
