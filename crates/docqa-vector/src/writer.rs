use anyhow::{anyhow, Result};
use arrow_array::types::Float32Type;
use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Arc;

use docqa_core::types::Document;

use crate::schema::build_arrow_schema;
use crate::table::table_exists;
use crate::LanceDocumentStore;

const WRITE_BATCH: usize = 1000;
const EMBED_BATCH: usize = 32;
const PROGRESS_TEMPLATE: &str = concat!(
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] ",
    "{pos}/{len} chunks ({percent}%) {msg}"
);

/// A chunk row ready to be written: key, document and its embedding.
#[derive(Debug, Clone)]
pub struct LanceRow {
    pub id: String,
    pub document: Document,
    pub vector: Vec<f32>,
}

impl LanceDocumentStore {
    pub(crate) async fn upsert(&self, documents: &[Document]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        let documents = dedup_by_id(documents);
        tracing::info!(chunks = documents.len(), table = %self.table_name, "storing documents");
        let pb = ProgressBar::new(documents.len() as u64);
        let style = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE)?.progress_chars("#>-");
        pb.set_style(style);
        for batch in documents.chunks(WRITE_BATCH) {
            let mut rows = Vec::with_capacity(batch.len());
            for sub in batch.chunks(EMBED_BATCH) {
                let texts: Vec<String> = sub.iter().map(|d| d.content.clone()).collect();
                let vectors = self.embedder.embed_batch(&texts)?;
                if vectors.len() != sub.len() {
                    return Err(anyhow!(
                        "embedder returned {} vectors for {} texts",
                        vectors.len(),
                        sub.len()
                    ));
                }
                for (doc, vector) in sub.iter().zip(vectors) {
                    if vector.len() != self.dim() {
                        return Err(anyhow!(
                            "dim mismatch: got {} expected {}",
                            vector.len(),
                            self.dim()
                        ));
                    }
                    rows.push(LanceRow { id: doc.id(), document: doc.clone(), vector });
                }
                pb.inc(sub.len() as u64);
            }
            self.write_rows(&rows).await?;
        }
        pb.finish_and_clear();
        tracing::info!(chunks = documents.len(), "stored documents");
        Ok(())
    }

    async fn write_rows(&self, rows: &[LanceRow]) -> Result<()> {
        let record_batch = rows_to_record_batch(rows, self.dim() as i32)?;
        let schema = record_batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
        if table_exists(&self.db, &self.table_name).await? {
            let table = self.db.open_table(&self.table_name).execute().await?;
            let mut mi = table.merge_insert(&["id"]);
            mi.when_matched_update_all(None).when_not_matched_insert_all();
            mi.execute(reader).await?;
        } else {
            self.db.create_table(&self.table_name, reader).execute().await?;
        }
        Ok(())
    }
}

/// Keep the last occurrence of every key so one write never carries duplicate ids.
fn dedup_by_id(documents: &[Document]) -> Vec<Document> {
    let mut last: HashMap<String, usize> = HashMap::new();
    for (i, doc) in documents.iter().enumerate() {
        last.insert(doc.id(), i);
    }
    documents
        .iter()
        .enumerate()
        .filter(|(i, doc)| last.get(&doc.id()) == Some(i))
        .map(|(_, doc)| doc.clone())
        .collect()
}

pub fn rows_to_record_batch(rows: &[LanceRow], dim: i32) -> Result<RecordBatch> {
    let schema = build_arrow_schema(dim);
    let mut ids = Vec::new();
    let mut contents = Vec::new();
    let mut sources = Vec::new();
    let mut filenames = Vec::new();
    let mut chunk_indices = Vec::new();
    let mut total_chunks = Vec::new();
    let mut file_types = Vec::new();
    let mut pages: Vec<Option<i32>> = Vec::new();
    let mut element_types: Vec<Option<String>> = Vec::new();
    let mut coordinates: Vec<Option<String>> = Vec::new();
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
    for row in rows {
        let meta = &row.document.metadata;
        ids.push(row.id.clone());
        contents.push(row.document.content.clone());
        sources.push(meta.source.clone());
        filenames.push(meta.filename.clone());
        chunk_indices.push(i32::try_from(meta.chunk_index)?);
        total_chunks.push(i32::try_from(meta.total_chunks)?);
        file_types.push(meta.file_type.clone());
        pages.push(meta.page_number);
        element_types.push(meta.element_type.clone());
        coordinates.push(meta.coordinates.clone());
        vectors.push(Some(row.vector.iter().map(|&x| Some(x)).collect()));
    }
    let record_batch = RecordBatch::try_new(schema, vec![
        Arc::new(StringArray::from(ids)),
        Arc::new(StringArray::from(contents)),
        Arc::new(StringArray::from(sources)),
        Arc::new(StringArray::from(filenames)),
        Arc::new(Int32Array::from(chunk_indices)),
        Arc::new(Int32Array::from(total_chunks)),
        Arc::new(StringArray::from(file_types)),
        Arc::new(Int32Array::from(pages)),
        Arc::new(StringArray::from(element_types)),
        Arc::new(StringArray::from(coordinates)),
        Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
            vectors.into_iter(),
            dim,
        )),
    ])?;
    Ok(record_batch)
}
