//! Document upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ingestion::extract_text;
use crate::server::state::AppState;
use crate::types::Document;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: String,
    pub doc_id: String,
    pub chunks: usize,
}

/// POST /upload - save an uploaded file, extract its text, and index it
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut saved = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Internal(format!("failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = sanitize_filename(field.file_name().unwrap_or("upload.bin"));
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::Internal(format!("failed to read file: {}", e)))?;

        let path = state.config().storage.upload_dir.join(&filename);
        tokio::fs::write(&path, &data).await?;
        tracing::info!(filename = %filename, bytes = data.len(), "saved upload");

        saved = Some((filename, path));
        break;
    }

    let (filename, path) = saved.ok_or_else(|| Error::EmptyInput("no file uploaded".into()))?;

    // File parsing is blocking CPU work
    let text = tokio::task::spawn_blocking(move || extract_text(&path))
        .await
        .map_err(|e| Error::Internal(format!("task join error: {}", e)))??;

    if text.trim().is_empty() {
        return Err(Error::EmptyInput("no text extracted from file".into()));
    }

    let doc_id = Uuid::new_v4().simple().to_string()[..8].to_string();
    let doc = Document::new(doc_id.clone(), filename, text);
    let chunks = state.indexer().index(&doc).await?;

    Ok(Json(UploadResponse {
        status: "ok".to_string(),
        doc_id,
        chunks,
    }))
}

/// Strip path components and shell-hostile characters from an uploaded
/// filename, keeping the extension intact for parser dispatch.
fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(['.', '_']).is_empty() {
        "upload.bin".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_filename;

    #[test]
    fn strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\report.pdf"), "report.pdf");
    }

    #[test]
    fn replaces_hostile_characters_but_keeps_extension() {
        assert_eq!(sanitize_filename("my report (v2).pdf"), "my_report__v2_.pdf");
    }

    #[test]
    fn degenerate_names_get_a_fallback() {
        assert_eq!(sanitize_filename("..."), "upload.bin");
        assert_eq!(sanitize_filename(""), "upload.bin");
    }
}
