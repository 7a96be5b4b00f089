use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use docqa_core::traits::DocumentStore;
use docqa_core::types::{Document, SearchResult};
use docqa_ingest::{
    ingest_directory, DocumentProcessor, PartitionClient, PartitionSettings,
    RecursiveCharacterSplitter,
};
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn processor_with_api(api_url: &str) -> DocumentProcessor {
    let mut settings = PartitionSettings::new("test-key");
    settings.api_url = api_url.to_string();
    let client = PartitionClient::new(settings).expect("client");
    DocumentProcessor::new(RecursiveCharacterSplitter::new(1000, 200), client)
}

fn processor() -> DocumentProcessor {
    processor_with_api("http://127.0.0.1:9/general/v0/general")
}

fn write_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w=""#,
            "http://schemas.openxmlformats.org/wordprocessingml/2006/main",
            r#"">"#,
            "<w:body>{body}</w:body></w:document>"
        ),
        body = body
    );
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default()).unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
}

#[derive(Default)]
struct MemoryStore {
    rows: Mutex<BTreeMap<String, Document>>,
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn store(&self, documents: &[Document]) -> anyhow::Result<()> {
        let mut rows = self.rows.lock().unwrap();
        for doc in documents {
            rows.insert(doc.id(), doc.clone());
        }
        Ok(())
    }

    async fn search(&self, _query: &str, _k: usize) -> Vec<SearchResult> {
        Vec::new()
    }

    async fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[tokio::test]
async fn long_text_file_becomes_three_chunks() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("long.txt");
    fs::write(&path, "a".repeat(2500)).unwrap();

    let docs = processor().process_document(&path).await;
    assert_eq!(docs.len(), 3);
    for (i, doc) in docs.iter().enumerate() {
        assert_eq!(doc.metadata.chunk_index, i);
        assert_eq!(doc.metadata.total_chunks, 3);
        assert_eq!(doc.metadata.filename, "long.txt");
        assert_eq!(doc.metadata.file_type, ".txt");
        assert_eq!(doc.metadata.source, path.to_string_lossy());
        assert_eq!(doc.metadata.page_number, None);
    }
}

#[tokio::test]
async fn docx_paragraphs_are_extracted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Report.DOCX");
    write_docx(&path, &["First paragraph.", "Second paragraph."]);

    let docs = processor().process_document(&path).await;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content, "First paragraph.\nSecond paragraph.");
    assert_eq!(docs[0].metadata.file_type, ".docx");
}

#[tokio::test]
async fn unsupported_missing_and_blank_files_yield_nothing() {
    let dir = TempDir::new().unwrap();
    let png = dir.path().join("image.png");
    fs::write(&png, b"\x89PNG").unwrap();
    let blank = dir.path().join("blank.md");
    fs::write(&blank, "  \n\n \t").unwrap();

    let p = processor();
    assert!(p.process_document(&png).await.is_empty());
    assert!(p.process_document(&blank).await.is_empty());
    assert!(p.process_document(&dir.path().join("nope.txt")).await.is_empty());
}

#[tokio::test]
async fn reprocessing_unchanged_file_gives_identical_keys() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.md");
    fs::write(&path, format!("{}\n\n{}", "alpha ".repeat(150), "beta ".repeat(150))).unwrap();

    let p = processor();
    let first: Vec<String> = p.process_document(&path).await.iter().map(Document::id).collect();
    let second: Vec<String> = p.process_document(&path).await.iter().map(Document::id).collect();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn pdf_chunks_take_element_metadata() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/general/v0/general")
                .header("unstructured-api-key", "test-key")
                .body_contains("hi_res")
                .body_contains("eng");
            then.status(200).json_body(json!([
                {
                    "type": "Title",
                    "text": "Rinvoq Guide",
                    "metadata": { "page_number": 3, "coordinates": { "system": "PixelSpace" } }
                },
                {
                    "type": "NarrativeText",
                    "text": "Rinvoq treats arthritis.",
                    "metadata": { "page_number": 4 }
                }
            ]));
        })
        .await;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("guide.pdf");
    fs::write(&path, "%PDF-1.4 test").unwrap();

    let docs = processor_with_api(&server.url("/general/v0/general")).process_document(&path).await;
    mock.assert_async().await;

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content, "Rinvoq Guide\n\nRinvoq treats arthritis.");
    assert_eq!(docs[0].metadata.page_number, Some(3));
    assert_eq!(docs[0].metadata.element_type.as_deref(), Some("Title"));
    assert_eq!(docs[0].metadata.coordinates.as_deref(), Some(r#"{"system":"PixelSpace"}"#));
}

#[tokio::test]
async fn pdf_partition_failure_yields_nothing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/general/v0/general");
            then.status(401).body("invalid api key");
        })
        .await;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("guide.pdf");
    fs::write(&path, "%PDF-1.4 test").unwrap();

    let p = processor_with_api(&server.url("/general/v0/general"));
    assert!(p.process_document(&path).await.is_empty());
    assert!(matches!(
        p.try_process_document(&path).await,
        Err(docqa_ingest::IngestError::Partition { status: 401, .. })
    ));
}

#[tokio::test]
async fn directory_walk_is_sorted_and_filtered() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("b.txt"), "bravo").unwrap();
    fs::write(dir.path().join("a.md"), "alpha").unwrap();
    fs::write(dir.path().join("sub/c.txt"), "charlie").unwrap();
    fs::write(dir.path().join("skip.csv"), "x,y").unwrap();

    let docs = processor().process_directory(dir.path()).await;
    let contents: Vec<&str> = docs.iter().map(|d| d.content.as_str()).collect();
    assert_eq!(contents, vec!["alpha", "bravo", "charlie"]);
}

#[tokio::test]
async fn ingest_directory_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let docs_dir = dir.path().join("docs");
    fs::create_dir_all(&docs_dir).unwrap();
    fs::write(docs_dir.join("one.txt"), "a".repeat(2500)).unwrap();
    fs::write(docs_dir.join("two.txt"), "short note").unwrap();

    let store = MemoryStore::default();
    let p = processor();
    let report = ingest_directory(&p, &docs_dir, &store).await.unwrap();
    assert_eq!(report.chunks_processed, 4);
    assert_eq!(report.total_in_store, 4);

    let again = ingest_directory(&p, &docs_dir, &store).await.unwrap();
    assert_eq!(again.total_in_store, 4);
}

#[tokio::test]
async fn ingest_creates_missing_docs_dir() {
    let dir = TempDir::new().unwrap();
    let docs_dir = dir.path().join("not-yet");
    let store = MemoryStore::default();
    let report = ingest_directory(&processor(), &docs_dir, &store).await.unwrap();
    assert!(docs_dir.is_dir());
    assert_eq!(report.chunks_processed, 0);
}
