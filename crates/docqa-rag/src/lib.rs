//! docqa-rag
//!
//! Question answering over the document store: retrieve the top chunks,
//! ask the generator for an answer grounded in them and return the answer
//! with source previews.

use docqa_core::config::Config;
use docqa_core::traits::{DocumentStore, Generator};
use docqa_core::types::{QueryResponse, SourcePreview, SystemStats};
use docqa_llm::GroqClient;
use docqa_vector::LanceDocumentStore;

/// Answer returned when retrieval finds nothing; the generator is not called.
pub const NO_RESULTS_ANSWER: &str =
    "I couldn't find any relevant information in the documents to answer your question.";
pub const DEFAULT_MAX_RESULTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Answer generation failed: {0}")]
    Generation(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

pub struct Pipeline<S, G> {
    store: S,
    generator: G,
    max_results: usize,
    embedding_model: String,
}

impl<S, G> Pipeline<S, G>
where
    S: DocumentStore,
    G: Generator,
{
    pub fn new(store: S, generator: G) -> Self {
        Self {
            store,
            generator,
            max_results: DEFAULT_MAX_RESULTS,
            embedding_model: docqa_embed::DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    pub fn with_max_results(mut self, k: usize) -> Self {
        self.max_results = k;
        self
    }

    pub fn with_embedding_model(mut self, name: impl Into<String>) -> Self {
        self.embedding_model = name.into();
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub async fn query(&self, question: &str) -> Result<QueryResponse, Error> {
        let results = self.store.search(question, self.max_results).await;
        tracing::info!(found = results.len(), k = self.max_results, "retrieved context");

        if results.is_empty() {
            return Ok(QueryResponse {
                query: question.to_string(),
                answer: NO_RESULTS_ANSWER.to_string(),
                sources: Vec::new(),
                found_results: 0,
            });
        }

        let answer = self
            .generator
            .generate(question, &results)
            .await
            .map_err(|e| Error::Generation(Box::new(e)))?;

        Ok(QueryResponse {
            query: question.to_string(),
            answer,
            sources: results.iter().map(SourcePreview::from_result).collect(),
            found_results: results.len(),
        })
    }

    pub async fn stats(&self) -> SystemStats {
        SystemStats {
            total_documents: self.store.count().await,
            llm_model: self.generator.model().to_string(),
            embedding_model: self.embedding_model.clone(),
            llm_connected: self.generator.test_connection().await,
        }
    }
}

pub type DefaultPipeline = Pipeline<LanceDocumentStore, GroqClient>;

/// LanceDB store plus Groq client, both configured from `config`.
pub async fn from_config(config: &Config) -> anyhow::Result<DefaultPipeline> {
    let store = LanceDocumentStore::from_config(config).await?;
    let generator = GroqClient::from_config(config)?;
    let embedding_model: String = config.get_or(
        "database.embedding_model",
        docqa_embed::DEFAULT_EMBEDDING_MODEL.to_string(),
    );
    Ok(Pipeline::new(store, generator)
        .with_max_results(config.get_or("ui.max_search_results", DEFAULT_MAX_RESULTS))
        .with_embedding_model(embedding_model))
}
