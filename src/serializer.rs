//! Serialization module for converting documents to YAML or JSON format.
//!
//! Besides the file formats, a document can be rendered as a JSON literal that
//! is safe to embed inside an HTML `<script>` block of a documentation page.

use crate::openapi_builder::Document;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &Document) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes a document to JSON format with pretty printing.
///
/// Non-ASCII text is written as-is, not escaped.
///
/// # Example
///
/// ```
/// use openapi_from_routes::config::Config;
/// use openapi_from_routes::openapi_builder::DocumentBuilder;
/// use openapi_from_routes::serializer::serialize_json;
///
/// let doc = DocumentBuilder::new(Config::default()).unwrap().build(&[]).unwrap();
/// let json = serialize_json(&doc).unwrap();
/// assert!(json.contains("\"openapi\": \"3.0.0\""));
/// ```
pub fn serialize_json(doc: &Document) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Serializes a document to compact JSON for embedding in an HTML template.
///
/// Every `</` is written as `<\/` so the literal cannot close the enclosing
/// `<script>` element. The result is still valid JSON with the same value.
pub fn serialize_json_literal(doc: &Document) -> Result<String> {
    debug!("Serializing OpenAPI document to an embeddable JSON literal");
    let json = serde_json::to_string(doc).context("Failed to serialize OpenAPI document to JSON")?;
    Ok(json.replace("</", "<\\/"))
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
