//! docqa-embed
//!
//! Local sentence embeddings via candle. `get_default_embedder` returns the
//! BERT model named by the configuration, or the deterministic
//! [`FakeEmbedder`] when `DOCQA_USE_FAKE_EMBEDDINGS=1` (or
//! `embedding.fake = true`) so tests never need model weights.

use anyhow::Result;

use docqa_core::config::{expand_path, Config};
use docqa_core::traits::Embedder;

pub mod bert;
pub mod device;
pub mod fake;
pub mod pool;
pub mod tokenize;

pub use bert::BertEmbedder;
pub use fake::FakeEmbedder;
pub use pool::{masked_mean_l2, Pooling};

pub const DEFAULT_EMBEDDING_MODEL: &str = "BAAI/bge-base-en-v1.5";
pub const DEFAULT_DIM: usize = 768;
pub const DEFAULT_MAX_LEN: usize = 512;

pub fn use_fake_embeddings(config: &Config) -> bool {
    let from_env = std::env::var("DOCQA_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    from_env || config.get_or("embedding.fake", false)
}

pub fn get_default_embedder(config: &Config) -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings(config) {
        let dim = config.get_or("embedding.dimension", DEFAULT_DIM);
        tracing::info!(dim, "using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(dim)));
    }
    let model_name: String =
        config.get_or("database.embedding_model", DEFAULT_EMBEDDING_MODEL.to_string());
    let explicit: Option<String> = config.get("embedding.model_dir").ok();
    let data_dir = config.data_dir().ok();
    let model_dir =
        bert::resolve_model_dir(explicit.map(expand_path), &model_name, data_dir.as_deref())?;
    let pooling = config.get_or("embedding.pooling", Pooling::default());
    let max_len = config.get_or("embedding.max_len", DEFAULT_MAX_LEN);
    Ok(Box::new(BertEmbedder::load(&model_dir, pooling, max_len)?))
}
