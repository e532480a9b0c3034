use axum::{
    extract::{Multipart, Path},
    response::Json,
    Extension,
};
use serde::Serialize;
use uuid::Uuid;

use crate::config;
use crate::database::{holdings, manager, portfolios};
use crate::error::ApiError;
use crate::ingest::{
    self, file_extension, is_allowed_file, ColumnMappingRequest, StoreError, UploadStore,
};
use crate::middleware::AuthUser;

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
    pub file_name: String,
    pub file_path: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub holdings_created: usize,
    pub message: String,
}

/// POST /api/portfolios/:portfolio_id/upload-holdings
///
/// Stores the uploaded file, parses it, records the stored path on the
/// portfolio and returns a preview for building the column mapping. Any
/// failure after the write removes the stored artifact before surfacing.
pub async fn upload_holdings(
    Extension(user): Extension<AuthUser>,
    Path(portfolio_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<PreviewResponse>, ApiError> {
    let pool = manager::pool().await?;
    portfolios::find_owned(&pool, portfolio_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;

    let (file_name, data) = read_file_field(&mut multipart).await?;

    if !is_allowed_file(&file_name) {
        return Err(ApiError::bad_request(
            "Invalid file type. Only CSV and Excel files are allowed.",
        ));
    }

    let store = UploadStore::from_config();
    let stored_path = store.store(portfolio_id, &file_name, &data).await?;

    // From here on the artifact must not be orphaned on failure
    let table = match ingest::parse(&data, &file_extension(&file_name)) {
        Ok(table) => table,
        Err(e) => {
            store.remove(&stored_path).await;
            return Err(ApiError::internal_server_error(format!(
                "Error processing file: {}",
                e
            )));
        }
    };

    if let Err(e) = portfolios::set_file_path(&pool, portfolio_id, &stored_path).await {
        store.remove(&stored_path).await;
        return Err(e.into());
    }

    let preview_rows = config::config().uploads.preview_rows;
    tracing::info!(
        %portfolio_id,
        total_rows = table.total_rows(),
        "Holdings file uploaded"
    );

    Ok(Json(PreviewResponse {
        headers: table.headers.clone(),
        rows: table.preview(preview_rows).to_vec(),
        total_rows: table.total_rows(),
        file_name,
        file_path: stored_path,
    }))
}

/// POST /api/portfolios/:portfolio_id/process-holdings
///
/// Re-parses the stored upload with the caller's column mapping and replaces
/// the portfolio's holdings in one transaction. Bad rows are skipped
/// silently; only whole-operation failures surface as errors.
pub async fn process_holdings(
    Extension(user): Extension<AuthUser>,
    Path(portfolio_id): Path<Uuid>,
    Json(payload): Json<ColumnMappingRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let pool = manager::pool().await?;
    let portfolio = portfolios::find_owned(&pool, portfolio_id, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio not found"))?;

    let mapping = payload.validate()?;

    let file_path = portfolio
        .file_path
        .ok_or_else(|| ApiError::bad_request("No uploaded file found for this portfolio"))?;

    let store = UploadStore::from_config();
    let data = match store.retrieve(&file_path).await {
        Ok(data) => data,
        Err(StoreError::NotFound(_)) => {
            return Err(ApiError::bad_request(
                "No uploaded file found for this portfolio",
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let table = ingest::parse(&data, &file_extension(&file_path)).map_err(|e| {
        ApiError::internal_server_error(format!("Error processing holdings: {}", e))
    })?;

    let staged = ingest::stage_holdings(&table.headers, &table.rows, &mapping);
    let holdings_created = holdings::replace_holdings(&pool, portfolio_id, &staged).await?;

    tracing::info!(%portfolio_id, holdings_created, "Holdings processed");

    Ok(Json(ProcessResponse {
        holdings_created,
        message: format!("Successfully processed {} holdings", holdings_created),
    }))
}

/// Pull the first field carrying a filename out of the multipart body
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

        return Ok((file_name, data.to_vec()));
    }

    Err(ApiError::bad_request("No file provided"))
}
