//! docqa-vector
//!
//! LanceDB-backed document store. Chunks are embedded on write and upserted
//! by their content-derived key; reads run a brute-force nearest-neighbour
//! search with the configured distance metric.

use anyhow::Result;
use async_trait::async_trait;
use lancedb::Connection;
use std::path::Path;

use docqa_core::config::Config;
use docqa_core::traits::{DocumentStore, Embedder};
use docqa_core::types::{DistanceMetric, Document, SearchResult};

pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub const DEFAULT_COLLECTION: &str = "documents";

pub struct LanceDocumentStore {
    pub(crate) db: Connection,
    pub(crate) table_name: String,
    pub(crate) embedder: Box<dyn Embedder>,
    pub(crate) metric: DistanceMetric,
}

impl LanceDocumentStore {
    pub async fn open(
        db_path: &Path,
        table_name: &str,
        embedder: Box<dyn Embedder>,
        metric: DistanceMetric,
    ) -> Result<Self> {
        let db = table::open_db(db_path).await?;
        tracing::debug!(
            path = %db_path.display(),
            table = table_name,
            %metric,
            "opened document store"
        );
        Ok(Self { db, table_name: table_name.to_string(), embedder, metric })
    }

    /// Open the store described by `paths.*` and `database.*` settings.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        std::fs::create_dir_all(&data_dir)?;
        let db_path = config.db_path()?;
        let table_name: String =
            config.get_or("database.collection_name", DEFAULT_COLLECTION.to_string());
        let metric = config.distance_metric()?;
        let embedder = docqa_embed::get_default_embedder(config)?;
        Self::open(&db_path, &table_name, embedder, metric).await
    }

    pub fn dim(&self) -> usize {
        self.embedder.dim()
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

#[async_trait]
impl DocumentStore for LanceDocumentStore {
    async fn store(&self, documents: &[Document]) -> Result<()> {
        self.upsert(documents).await
    }

    async fn search(&self, query: &str, k: usize) -> Vec<SearchResult> {
        match self.try_search(query, k).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(error = %e, "search failed");
                Vec::new()
            }
        }
    }

    async fn count(&self) -> usize {
        match self.try_count().await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "count failed");
                0
            }
        }
    }
}
