//! Document I/O: loading/saving source and output PDFs, on disk or in memory.
//! The imposition core itself is a pure function of bytes in, bytes out — this
//! module is what feeds and drains that function for a CLI or file-based caller.

use crate::types::*;
use lopdf::Document;
use std::path::Path;

/// Load a PDF from disk.
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    load_pdf_bytes(bytes).await
}

/// Parse a PDF already held in memory (e.g. an HTTP upload).
pub async fn load_pdf_bytes(bytes: Vec<u8>) -> Result<Document> {
    tokio::task::spawn_blocking(move || Document::load_mem(&bytes).map_err(ImposeError::from)).await?
}

/// Load several source PDFs from disk, in order.
pub async fn load_multiple_pdfs(paths: &[impl AsRef<Path>]) -> Result<Vec<Document>> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        documents.push(load_pdf(path).await?);
    }
    Ok(documents)
}

/// Serialize a document and write it to disk.
pub async fn save_pdf(doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = to_bytes(doc).await?;
    tokio::fs::write(&path, bytes).await?;
    Ok(())
}

/// Serialize a document to bytes, e.g. for an HTTP response body.
pub async fn to_bytes(mut doc: Document) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, ImposeError>(writer)
    })
    .await?
}
