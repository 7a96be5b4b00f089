//! Client for the hosted Unstructured partition API, used for PDFs.
//!
//! The file is uploaded as multipart form data with the `hi_res` strategy and
//! English OCR. The response is a JSON array of elements; each element with
//! non-blank text contributes its text and an [`ElementMetadata`] entry.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use docqa_core::config::Config;
use docqa_core::types::ElementMetadata;

use crate::error::{IngestError, Result};

pub const DEFAULT_API_URL: &str = "https://api.unstructuredio.io/general/v0/general";
pub const DEFAULT_STRATEGY: &str = "hi_res";
pub const DEFAULT_LANGUAGES: &str = "eng";
const API_KEY_HEADER: &str = "unstructured-api-key";

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSettings {
    pub api_url: String,
    pub api_key: String,
    pub strategy: String,
    pub languages: String,
    pub timeout: Duration,
}

impl PartitionSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            strategy: DEFAULT_STRATEGY.to_string(),
            languages: DEFAULT_LANGUAGES.to_string(),
            timeout: Duration::from_secs(300),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut settings = Self::new(config.unstructured_api_key());
        settings.api_url = config.get_or("unstructured.api_url", settings.api_url);
        settings.strategy = config.get_or("unstructured.strategy", settings.strategy);
        settings.timeout = Duration::from_secs(config.get_or("unstructured.timeout_secs", 300u64));
        settings
    }
}

/// Text plus per-element metadata extracted from one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitioned {
    pub text: String,
    pub elements: Vec<ElementMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(rename = "type", default)]
    element_type: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    metadata: Option<RawElementMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct RawElementMetadata {
    #[serde(default)]
    page_number: Option<i32>,
    #[serde(default)]
    coordinates: Option<serde_json::Value>,
}

pub struct PartitionClient {
    http: reqwest::Client,
    settings: PartitionSettings,
}

impl PartitionClient {
    pub fn new(settings: PartitionSettings) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { http, settings })
    }

    pub async fn partition(&self, path: &Path) -> Result<Partitioned> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| IngestError::Io { path: path.to_path_buf(), source })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        let part = Part::bytes(bytes).file_name(file_name).mime_str("application/pdf")?;
        let form = Form::new()
            .part("files", part)
            .text("strategy", self.settings.strategy.clone())
            .text("languages", self.settings.languages.clone());

        tracing::debug!(
            url = %self.settings.api_url,
            file = %path.display(),
            "partitioning document"
        );
        let resp = self
            .http
            .post(&self.settings.api_url)
            .header(API_KEY_HEADER, &self.settings.api_key)
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        if !(200..300).contains(&status) {
            let message: String = body.chars().take(500).collect();
            return Err(IngestError::Partition { status, message });
        }
        parse_elements(&body)
    }
}

/// Join element texts with blank lines and keep their metadata in order.
pub fn parse_elements(body: &str) -> Result<Partitioned> {
    let raw: Vec<RawElement> =
        serde_json::from_str(body).map_err(|e| IngestError::Deserialization(e.to_string()))?;
    let mut texts = Vec::new();
    let mut elements = Vec::new();
    for el in raw {
        let Some(text) = el.text.filter(|t| !t.trim().is_empty()) else {
            continue;
        };
        let meta = el.metadata.unwrap_or_default();
        let coordinates = meta.coordinates.filter(|c| !is_empty_json(c)).map(|c| c.to_string());
        elements.push(ElementMetadata {
            element_type: el.element_type.unwrap_or_default(),
            page_number: meta.page_number.unwrap_or(0),
            coordinates,
        });
        texts.push(text);
    }
    Ok(Partitioned { text: texts.join("\n\n"), elements })
}

fn is_empty_json(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_elements_are_skipped() {
        let body = r#"[
            {"type": "Title", "text": "Rinvoq", "metadata": {"page_number": 1, "coordinates": {}}},
            {"type": "Image", "text": "  ", "metadata": {"page_number": 1}},
            {"type": "PageBreak", "text": null, "metadata": null},
            {"type": "NarrativeText", "text": "Used for arthritis.",
             "metadata": {"page_number": 2, "coordinates": {"points": [[0, 0]]}}}
        ]"#;
        let parsed = parse_elements(body).unwrap();
        assert_eq!(parsed.text, "Rinvoq\n\nUsed for arthritis.");
        assert_eq!(parsed.elements.len(), 2);
        assert_eq!(parsed.elements[0].element_type, "Title");
        assert_eq!(parsed.elements[0].coordinates, None);
        assert_eq!(parsed.elements[1].page_number, 2);
        assert_eq!(parsed.elements[1].coordinates.as_deref(), Some(r#"{"points":[[0,0]]}"#));
    }

    #[test]
    fn non_array_body_is_rejected() {
        let err = parse_elements(r#"{"detail": "bad"}"#);
        assert!(matches!(err, Err(IngestError::Deserialization(_))));
    }
}
