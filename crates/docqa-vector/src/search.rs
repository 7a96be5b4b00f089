use anyhow::{anyhow, Result};
use arrow_array::{Array, Float32Array, Int32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::DistanceType;

use docqa_core::types::{ChunkMetadata, DistanceMetric, SearchResult};

use crate::table::table_exists;
use crate::LanceDocumentStore;

pub(crate) fn distance_type(metric: DistanceMetric) -> DistanceType {
    match metric {
        DistanceMetric::Cosine => DistanceType::Cosine,
        DistanceMetric::Dot => DistanceType::Dot,
        DistanceMetric::L2 => DistanceType::L2,
    }
}

impl LanceDocumentStore {
    /// Nearest-neighbour search that surfaces backend failures.
    /// A missing table means nothing was ingested yet and yields no results.
    pub async fn try_search(&self, query_text: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 || !table_exists(&self.db, &self.table_name).await? {
            return Ok(Vec::new());
        }
        let query_embedding = self
            .embedder
            .embed_batch(&[query_text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut stream = table
            .vector_search(query_embedding)?
            .distance_type(distance_type(self.metric))
            .limit(k)
            .execute()
            .await?;
        let mut hits: Vec<(f32, SearchResult)> = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            hits.extend(self.batch_to_results(&batch)?);
        }
        hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits.into_iter().map(|(_, r)| r).collect())
    }

    pub async fn try_count(&self) -> Result<usize> {
        if !table_exists(&self.db, &self.table_name).await? {
            return Ok(0);
        }
        let table = self.db.open_table(&self.table_name).execute().await?;
        Ok(table.count_rows(None).await?)
    }

    fn batch_to_results(&self, batch: &RecordBatch) -> Result<Vec<(f32, SearchResult)>> {
        let content = string_col(batch, "content")?;
        let source = string_col(batch, "source")?;
        let filename = string_col(batch, "filename")?;
        let chunk_index = int_col(batch, "chunk_index")?;
        let total_chunks = int_col(batch, "total_chunks")?;
        let file_type = string_col(batch, "file_type")?;
        let page_number = int_col(batch, "page_number")?;
        let element_type = string_col(batch, "element_type")?;
        let coordinates = string_col(batch, "coordinates")?;
        let distance = batch
            .column_by_name("_distance")
            .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
            .ok_or_else(|| anyhow!("missing _distance column"))?;

        let mut out = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            let d = distance.value(i);
            let metadata = ChunkMetadata {
                source: source.value(i).to_string(),
                filename: filename.value(i).to_string(),
                chunk_index: usize::try_from(chunk_index.value(i)).unwrap_or_default(),
                total_chunks: usize::try_from(total_chunks.value(i)).unwrap_or_default(),
                file_type: file_type.value(i).to_string(),
                page_number: (!page_number.is_null(i)).then(|| page_number.value(i)),
                element_type: (!element_type.is_null(i)).then(|| element_type.value(i).to_string()),
                coordinates: (!coordinates.is_null(i)).then(|| coordinates.value(i).to_string()),
            };
            let result = SearchResult {
                content: content.value(i).to_string(),
                metadata,
                similarity: self.metric.similarity(d),
            };
            out.push((d, result));
        }
        Ok(out)
    }
}

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("missing {} column", name))
}

fn int_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int32Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
        .ok_or_else(|| anyhow!("missing {} column", name))
}
