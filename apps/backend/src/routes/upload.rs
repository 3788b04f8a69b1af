//! Spreadsheet upload endpoint

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use vocab_core::pairs_from_grid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::{import::import_pairs, spreadsheet};
use crate::AppState;

/// POST /api/upload
/// Import (word, group_name) rows from the `file` part of a multipart form
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportResponse>> {
    let mut multipart = multipart?;
    let mut workbook = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        spreadsheet::ensure_xlsx(&filename)?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        workbook = Some((filename, bytes));
        break;
    }

    let (filename, bytes) =
        workbook.ok_or_else(|| ApiError::BadRequest("missing 'file' upload".to_string()))?;

    let grid = spreadsheet::read_xlsx(bytes.to_vec())?;
    let pairs = pairs_from_grid(grid)?;
    tracing::info!("Importing {} rows from {}", pairs.len(), filename);

    let report = match import_pairs(state.db.as_ref(), state.lexicon.as_ref(), pairs).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Import of {} aborted", filename);
            return Err(e);
        }
    };

    Ok(Json(ImportResponse {
        message: format!("Imported {filename}"),
        stats: report.stats,
        failed_words: report.failed_words,
    }))
}
