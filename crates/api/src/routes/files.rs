//! File transfer routes: upload, download, delete and list.
//!
//! Each handler is a direct pass-through to one [`StorageService`] call.
//!
//! [`StorageService`]: filegate_core::storage::StorageService

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        DefaultBodyLimit, Multipart, Path, Query, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{AppState, error::ApiError};
use filegate_core::storage::{DEFAULT_CONTENT_TYPE, ObjectSummary, original_filename};
use filegate_shared::AppError;

/// Multipart field carrying the upload.
const FILE_FIELD: &str = "file";

const NO_FILE_MESSAGE: &str = "No file provided. Please include a file in the request.";

/// Default for `max_keys` on the list route.
pub const DEFAULT_MAX_KEYS: usize = 100;

/// Creates the file routes. `max_upload_bytes` caps the upload body.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/upload/",
            post(upload_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/download/{file_key}/", get(download_file))
        .route("/delete/{file_key}/", delete(delete_file))
        .route("/list/", get(list_files))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for a completed upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: &'static str,
    /// Generated storage key.
    pub file_key: String,
    /// Public URL of the object.
    pub url: String,
    /// Filename as uploaded.
    pub original_filename: String,
}

/// Response for a completed delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: &'static str,
    /// Deleted key.
    pub file_key: String,
}

/// Response for a listing.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    /// Always `true`.
    pub success: bool,
    /// Matching objects.
    pub files: Vec<ObjectSummary>,
    /// Number of entries in `files`.
    pub count: usize,
}

/// Query parameters for the list route.
///
/// `max_keys` is kept as text so a malformed value can be reported in the
/// JSON envelope instead of the framework's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Key prefix filter.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Maximum number of entries.
    #[serde(default)]
    pub max_keys: Option<String>,
}

/// File part pulled out of a multipart body.
struct FilePart {
    filename: String,
    content_type: Option<String>,
    content: Bytes,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse `max_keys`, defaulting to [`DEFAULT_MAX_KEYS`].
fn parse_max_keys(raw: Option<&str>) -> Result<usize, AppError> {
    match raw {
        None => Ok(DEFAULT_MAX_KEYS),
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| AppError::Validation("max_keys must be a non-negative integer".into())),
    }
}

/// `Content-Disposition` value naming the file as the caller uploaded it.
fn content_disposition(file_key: &str) -> HeaderValue {
    let filename = original_filename(file_key)
        .replace('\\', "\\\\")
        .replace('"', "\\\"");

    HeaderValue::try_from(format!("attachment; filename=\"{filename}\"")).unwrap_or_else(|_| {
        warn!(file_key, "Filename not valid in a header; sending bare attachment");
        HeaderValue::from_static("attachment")
    })
}

/// Last path segment of a client-supplied filename, trimmed. Some clients
/// send the full local path.
fn client_basename(raw: &str) -> &str {
    raw.rfind(['/', '\\'])
        .map_or(raw, |idx| &raw[idx + 1..])
        .trim()
}

fn multipart_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(err.body_text())
    }
}

/// Find the `file` part. Parts without a usable filename are plain form
/// fields.
async fn read_file_part(multipart: &mut Multipart) -> Result<Option<FilePart>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field
            .file_name()
            .map(client_basename)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let content = field.bytes().await.map_err(|e| multipart_error(&e))?;

        return Ok(Some(FilePart {
            filename,
            content_type,
            content,
        }));
    }

    Ok(None)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/upload/` - Upload the multipart `file` field.
async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let Ok(mut multipart) = multipart else {
        warn!("Upload without a multipart body");
        return Err(AppError::Validation(NO_FILE_MESSAGE.into()).into());
    };

    let Some(part) = read_file_part(&mut multipart).await? else {
        warn!("Upload without a file field");
        return Err(AppError::Validation(NO_FILE_MESSAGE.into()).into());
    };

    let uploaded = state
        .storage
        .put(part.content, &part.filename, part.content_type.as_deref())
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    info!(file_key = %uploaded.file_key, "File uploaded");

    let response = UploadResponse {
        success: true,
        message: "File uploaded successfully",
        file_key: uploaded.file_key,
        url: uploaded.url,
        original_filename: uploaded.original_filename,
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// GET `/download/{file_key}/` - Stream the object back as an attachment.
async fn download_file(
    State(state): State<AppState>,
    Path(file_key): Path<String>,
) -> Result<Response, ApiError> {
    let object = state
        .storage
        .get(&file_key)
        .await
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    let content_type = HeaderValue::from_str(&object.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, content_disposition(&file_key)),
        ],
        object.content,
    )
        .into_response())
}

/// DELETE `/delete/{file_key}/` - Remove the object.
async fn delete_file(
    State(state): State<AppState>,
    Path(file_key): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let file_key = state
        .storage
        .delete(&file_key)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "File deleted successfully",
        file_key,
    }))
}

/// GET `/list/?prefix=&max_keys=` - List objects by prefix.
async fn list_files(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let max_keys = parse_max_keys(params.max_keys.as_deref())?;
    let prefix = params.prefix.unwrap_or_default();

    let files = state
        .storage
        .list(&prefix, max_keys)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    Ok(Json(ListResponse {
        success: true,
        count: files.len(),
        files,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, Ok(100))]
    #[case(Some("50"), Ok(50))]
    #[case(Some(" 7 "), Ok(7))]
    #[case(Some("0"), Ok(0))]
    #[case(Some("-1"), Err(()))]
    #[case(Some("abc"), Err(()))]
    #[case(Some(""), Err(()))]
    fn test_parse_max_keys(#[case] raw: Option<&str>, #[case] expected: Result<usize, ()>) {
        assert_eq!(parse_max_keys(raw).map_err(|_| ()), expected);
    }

    #[rstest]
    #[case(
        "0123456789abcdef0123456789abcdef_hello.txt",
        "attachment; filename=\"hello.txt\""
    )]
    #[case("abc_my_report.pdf", "attachment; filename=\"my_report.pdf\"")]
    #[case("nounderscore.bin", "attachment; filename=\"nounderscore.bin\"")]
    #[case("abc_say \"hi\".txt", "attachment; filename=\"say \\\"hi\\\".txt\"")]
    #[case("abc_line\nbreak.txt", "attachment")]
    fn test_content_disposition(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(content_disposition(key), expected);
    }

    #[rstest]
    #[case("hello.txt", "hello.txt")]
    #[case("sub/hello.txt", "hello.txt")]
    #[case("../../etc/passwd", "passwd")]
    #[case("C:\\Users\\me\\report.pdf", "report.pdf")]
    #[case("  spaced.txt ", "spaced.txt")]
    #[case("dir/", "")]
    #[case("", "")]
    #[case("   ", "")]
    fn test_client_basename(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(client_basename(raw), expected);
    }
}
