//! Bulk document loading through the HTTP API
//!
//! Reads `*.json` files from a directory - each an array of
//! `{content, metadata}` records - and uploads them in batches through
//! `POST /documents/batch` of a running server. Files that fail to parse
//! are reported and skipped; so are failed batches. A health preflight
//! catches a missing server before any work is done.

use std::path::Path;

use tracing::warn;

use crate::api::types::DocumentListRequest;
use crate::api::types::DocumentRequest;
use crate::errors::Result;
use crate::RagServeError;

/// Documents per upload batch; large batches make single requests slow
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Summary of one load run
#[derive(Debug, Default)]
pub struct LoadReport {
    pub files_read: usize,
    pub files_skipped: usize,
    pub documents: usize,
    pub batches_sent: usize,
    pub batches_failed: usize,
}

/// Collect documents from every `*.json` file in a directory.
///
/// Files are visited in name order so runs are deterministic. A file that
/// is not a JSON array of documents is skipped with a warning, not fatal.
pub fn collect_documents(dir: &Path) -> Result<(Vec<DocumentRequest>, LoadReport)> {
    if !dir.is_dir() {
        return Err(RagServeError::Config(format!(
            "Data directory not found: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut report = LoadReport::default();
    let mut documents = Vec::new();

    for path in paths {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                report.files_skipped += 1;
                continue;
            }
        };

        match serde_json::from_str::<Vec<DocumentRequest>>(&content) {
            Ok(mut parsed) => {
                report.files_read += 1;
                documents.append(&mut parsed);
            }
            Err(e) => {
                warn!("Skipping {}: not a document array ({})", path.display(), e);
                report.files_skipped += 1;
            }
        }
    }

    report.documents = documents.len();
    Ok((documents, report))
}

/// Upload all documents under `dir` to a running server.
pub async fn load_directory(dir: &Path, endpoint: &str, batch_size: usize) -> Result<LoadReport> {
    let (documents, mut report) = collect_documents(dir)?;
    println!(
        "Found {} documents across {} files ({} skipped)",
        report.documents, report.files_read, report.files_skipped
    );

    if documents.is_empty() {
        return Err(RagServeError::Config(format!(
            "No documents to load under {}",
            dir.display()
        )));
    }

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()
        .map_err(|e| RagServeError::Http(e.to_string()))?;

    // Preflight: fail before any batch if the server is not up
    let health_url = format!("{endpoint}/health");
    let health = client
        .get(&health_url)
        .send()
        .await
        .map_err(|e| RagServeError::Http(format!("Cannot reach the server at {endpoint}: {e}")))?;
    if !health.status().is_success() {
        return Err(RagServeError::Http(format!(
            "Server at {endpoint} is not healthy ({})",
            health.status()
        )));
    }

    let batch_size = batch_size.max(1);
    let batch_url = format!("{endpoint}/documents/batch");
    let total_batches = documents.len().div_ceil(batch_size);

    for (batch_num, batch) in documents.chunks(batch_size).enumerate() {
        println!(
            "Uploading batch {}/{} ({} documents)...",
            batch_num + 1,
            total_batches,
            batch.len()
        );

        let request = DocumentListRequest {
            documents: batch.to_vec(),
        };

        let sent = client.post(&batch_url).json(&request).send().await;
        match sent {
            Ok(response) if response.status().is_success() => {
                report.batches_sent += 1;
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!("Batch {} failed: {} - {}", batch_num + 1, status, body);
                report.batches_failed += 1;
            }
            Err(e) => {
                warn!("Batch {} failed: {}", batch_num + 1, e);
                report.batches_failed += 1;
            }
        }
    }

    println!(
        "Load complete: {}/{} batches uploaded",
        report.batches_sent, total_batches
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.json"),
            r#"[{"content": "first", "metadata": {"source": "a.json"}}, {"content": "second"}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("b.json"), r#"[{"content": "third"}]"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (documents, report) = collect_documents(dir.path()).unwrap();
        assert_eq!(documents.len(), 3);
        assert_eq!(report.files_read, 2);
        assert_eq!(report.files_skipped, 0);
        // Name order: a.json before b.json
        assert_eq!(documents[0].content, "first");
        assert_eq!(documents[2].content, "third");
    }

    #[test]
    fn test_collect_skips_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("ok.json"), r#"[{"content": "fine"}]"#).unwrap();

        let (documents, report) = collect_documents(dir.path()).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(report.files_read, 1);
        assert_eq!(report.files_skipped, 1);
    }

    #[test]
    fn test_missing_directory() {
        let err = collect_documents(Path::new("/nonexistent/data")).unwrap_err();
        assert!(err.to_string().contains("Data directory not found"));
    }
}
