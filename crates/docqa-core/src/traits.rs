use async_trait::async_trait;

use crate::types::{Document, SearchResult};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Persistent similarity index over document chunks.
///
/// Read paths never fail: `search` yields an empty list and `count` yields
/// zero when the backend errors.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn store(&self, documents: &[Document]) -> anyhow::Result<()>;
    async fn search(&self, query: &str, k: usize) -> Vec<SearchResult>;
    async fn count(&self) -> usize;
}

/// Produces an answer to a question from retrieved context.
#[async_trait]
pub trait Generator: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn model(&self) -> &str;
    async fn generate(
        &self,
        question: &str,
        context: &[SearchResult],
    ) -> Result<String, Self::Error>;
    async fn test_connection(&self) -> bool;
}
