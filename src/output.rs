//! Finalized report output and its HTTP delivery payload.

use crate::error::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

/// A finished PDF document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfOutput {
    bytes: Vec<u8>,
    page_count: usize,
}

impl PdfOutput {
    /// Wrap finished PDF bytes.
    pub fn new(bytes: Vec<u8>, page_count: usize) -> Self {
        Self { bytes, page_count }
    }

    /// The PDF bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the PDF bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Standard base64 encoding of the bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Write the document to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), &self.bytes)?;
        log::info!("Saved {} bytes to {}", self.bytes.len(), path.as_ref().display());
        Ok(())
    }
}

/// Response payload for serving a report over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// HTTP status
    pub status_code: u16,
    /// Response headers, in insertion order
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    /// Body; base64 for attachments, JSON for errors
    pub body: String,
    /// Set for binary bodies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_base64_encoded: Option<bool>,
}

impl HttpResponse {
    /// 200 response carrying the PDF as a download named `filename`.
    pub fn attachment(output: &PdfOutput, filename: &str) -> Self {
        let mut headers = IndexMap::new();
        headers.insert("Content-Type".to_string(), "application/pdf".to_string());
        headers.insert(
            "Content-Disposition".to_string(),
            format!("attachment; filename=\"{}\"", filename),
        );
        Self {
            status_code: 200,
            headers,
            body: output.to_base64(),
            is_base64_encoded: Some(true),
        }
    }

    /// 500 response with a JSON `message` body.
    pub fn error(err: &dyn std::fmt::Display) -> Self {
        let body = serde_json::json!({ "message": format!("An error occurred: {}", err) });
        Self {
            status_code: 500,
            headers: IndexMap::new(),
            body: body.to_string(),
            is_base64_encoded: None,
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
