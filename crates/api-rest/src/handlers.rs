//! File endpoints.
//!
//! Each route parses its path segments into a [`FolderKey`] before touching
//! storage, so invalid identifiers never reach the filesystem. Storage calls
//! are blocking and run on tokio's blocking pool.
//!
//! The third path segment is read according to the category: a resource id
//! for resource-scoped categories, a file name otherwise.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path as AxumPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use cenad_files::{
    paths::parse_tenant, Category, FileMetadata, FilesResult, FilesService, FolderKey,
    IncomingFile, SaveOutcome,
};
use serde::Serialize;
use tokio_util::io::ReaderStream;
use utoipa::ToSchema;

use crate::error::{api_error, files_error, join_error, ApiError};
use crate::AppState;

/// Multipart field names that carry files; other fields are ignored.
const FILE_FIELDS: [&str; 2] = ["file", "files"];

/// Metadata of one stored file
#[derive(Debug, Serialize, ToSchema)]
pub struct FileInfo {
    pub file_name: String,
    pub size_bytes: u64,
    /// RFC 3339 modification time
    pub modified_at: Option<String>,
    pub media_type: Option<String>,
    /// Download route of the file
    pub url: String,
}

impl FileInfo {
    fn new(key: &FolderKey, m: FileMetadata) -> Self {
        Self {
            url: file_url(key, m.file_name.as_str()),
            file_name: m.file_name.to_string(),
            size_bytes: m.size_bytes,
            modified_at: m.modified_at.map(|t| t.to_rfc3339()),
            media_type: m.media_type,
        }
    }
}

/// Route that downloads `file_name` from the folder of `key`, with every
/// segment percent-encoded.
fn file_url(key: &FolderKey, file_name: &str) -> String {
    let mut url = format!(
        "/api/files/{}/{}",
        urlencoding::encode(key.tenant().as_str()),
        key.category().slug()
    );
    if let Some(resource) = key.resource() {
        url.push('/');
        url.push_str(&urlencoding::encode(resource.as_str()));
    }
    url.push('/');
    url.push_str(&urlencoding::encode(file_name));
    url
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListFilesRes {
    pub files: Vec<FileInfo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FailedUpload {
    pub file_name: String,
    pub error: String,
}

/// Per-file result of an upload
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct UploadRes {
    pub saved: Vec<String>,
    pub failed: Vec<FailedUpload>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteFileRes {
    pub file_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

/// Multipart upload form; repeat the field to upload several files
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    files: Vec<u8>,
}

#[utoipa::path(
    delete,
    path = "/api/files/{tenant}",
    params(("tenant" = String, Path, description = "Tenant id")),
    responses(
        (status = 200, description = "Tenant folder deleted", body = MessageRes),
        (status = 400, description = "Invalid tenant id", body = crate::error::ErrorRes),
        (status = 500, description = "Internal server error", body = crate::error::ErrorRes)
    )
)]
/// Delete every file belonging to a tenant
///
/// Succeeds when the tenant has no folder.
#[axum::debug_handler]
pub(crate) async fn delete_tenant(
    State(state): State<AppState>,
    AxumPath(tenant): AxumPath<String>,
) -> Result<Json<MessageRes>, ApiError> {
    let tenant = parse_tenant(&tenant).map_err(files_error)?;
    let message = run_blocking(&state.files, move |s| s.delete_tenant(&tenant)).await?;
    Ok(Json(MessageRes { message }))
}

#[utoipa::path(
    get,
    path = "/api/files/{tenant}/{category}",
    params(
        ("tenant" = String, Path, description = "Tenant id"),
        ("category" = String, Path, description = "Tenant-scoped category token")
    ),
    responses(
        (status = 200, description = "Files in the category folder", body = ListFilesRes),
        (status = 400, description = "Invalid identifier or resource-scoped category", body = crate::error::ErrorRes),
        (status = 404, description = "Unknown category", body = crate::error::ErrorRes)
    )
)]
/// List a tenant-scoped category folder
#[axum::debug_handler]
pub(crate) async fn list_category(
    State(state): State<AppState>,
    AxumPath((tenant, category)): AxumPath<(String, String)>,
) -> Result<Json<ListFilesRes>, ApiError> {
    let key = folder_key(&tenant, &category, None)?;
    list_files(&state, key).await
}

#[utoipa::path(
    post,
    path = "/api/files/{tenant}/{category}",
    params(
        ("tenant" = String, Path, description = "Tenant id"),
        ("category" = String, Path, description = "Tenant-scoped category token")
    ),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "All files saved", body = UploadRes),
        (status = 200, description = "Some files failed", body = UploadRes),
        (status = 400, description = "Invalid identifier or file name", body = crate::error::ErrorRes),
        (status = 413, description = "Upload exceeds the category limit", body = crate::error::ErrorRes)
    )
)]
/// Upload one or more files to a tenant-scoped category folder
#[axum::debug_handler]
pub(crate) async fn upload_category(
    State(state): State<AppState>,
    AxumPath((tenant, category)): AxumPath<(String, String)>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadRes>), ApiError> {
    let key = folder_key(&tenant, &category, None)?;
    upload(&state, key, multipart).await
}

#[utoipa::path(
    delete,
    path = "/api/files/{tenant}/{category}",
    params(
        ("tenant" = String, Path, description = "Tenant id"),
        ("category" = String, Path, description = "Tenant-scoped category token")
    ),
    responses(
        (status = 200, description = "Folder deleted", body = MessageRes),
        (status = 400, description = "Invalid identifier", body = crate::error::ErrorRes),
        (status = 404, description = "Unknown category", body = crate::error::ErrorRes)
    )
)]
/// Delete a tenant-scoped category folder
#[axum::debug_handler]
pub(crate) async fn delete_category(
    State(state): State<AppState>,
    AxumPath((tenant, category)): AxumPath<(String, String)>,
) -> Result<Json<MessageRes>, ApiError> {
    let key = folder_key(&tenant, &category, None)?;
    delete_folder(&state, key).await
}

#[utoipa::path(
    get,
    path = "/api/files/{tenant}/{category}/{segment}",
    params(
        ("tenant" = String, Path, description = "Tenant id"),
        ("category" = String, Path, description = "Category token"),
        ("segment" = String, Path, description = "Resource id, or file name for tenant-scoped categories")
    ),
    responses(
        (status = 200, description = "Resource folder listing, or file content"),
        (status = 400, description = "Invalid identifier", body = crate::error::ErrorRes),
        (status = 404, description = "File or category not found", body = crate::error::ErrorRes)
    )
)]
/// List a resource folder, or download a file of a tenant-scoped category
#[axum::debug_handler]
pub(crate) async fn get_category_entry(
    State(state): State<AppState>,
    AxumPath((tenant, category, segment)): AxumPath<(String, String, String)>,
) -> Result<Response, ApiError> {
    let category = parse_category(&category)?;
    if category.is_resource_scoped() {
        let key = FolderKey::parse(category, &tenant, Some(&segment)).map_err(files_error)?;
        Ok(list_files(&state, key).await?.into_response())
    } else {
        let key = FolderKey::parse(category, &tenant, None).map_err(files_error)?;
        download(&state, key, segment).await
    }
}

#[utoipa::path(
    post,
    path = "/api/files/{tenant}/{category}/{resource}",
    params(
        ("tenant" = String, Path, description = "Tenant id"),
        ("category" = String, Path, description = "Resource-scoped category token"),
        ("resource" = String, Path, description = "Resource or request id")
    ),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "All files saved", body = UploadRes),
        (status = 200, description = "Some files failed", body = UploadRes),
        (status = 400, description = "Invalid identifier or tenant-scoped category", body = crate::error::ErrorRes),
        (status = 413, description = "Upload exceeds the category limit", body = crate::error::ErrorRes)
    )
)]
/// Upload one or more files to a resource folder
#[axum::debug_handler]
pub(crate) async fn upload_resource(
    State(state): State<AppState>,
    AxumPath((tenant, category, resource)): AxumPath<(String, String, String)>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadRes>), ApiError> {
    let key = folder_key(&tenant, &category, Some(&resource))?;
    upload(&state, key, multipart).await
}

#[utoipa::path(
    delete,
    path = "/api/files/{tenant}/{category}/{segment}",
    params(
        ("tenant" = String, Path, description = "Tenant id"),
        ("category" = String, Path, description = "Category token"),
        ("segment" = String, Path, description = "Resource id, or file name for tenant-scoped categories")
    ),
    responses(
        (status = 200, description = "Resource folder or file deleted"),
        (status = 400, description = "Invalid identifier", body = crate::error::ErrorRes),
        (status = 404, description = "File or category not found", body = crate::error::ErrorRes)
    )
)]
/// Delete a resource folder, or a file of a tenant-scoped category
#[axum::debug_handler]
pub(crate) async fn delete_category_entry(
    State(state): State<AppState>,
    AxumPath((tenant, category, segment)): AxumPath<(String, String, String)>,
) -> Result<Response, ApiError> {
    let category = parse_category(&category)?;
    if category.is_resource_scoped() {
        let key = FolderKey::parse(category, &tenant, Some(&segment)).map_err(files_error)?;
        Ok(delete_folder(&state, key).await?.into_response())
    } else {
        let key = FolderKey::parse(category, &tenant, None).map_err(files_error)?;
        Ok(delete_file(&state, key, segment).await?.into_response())
    }
}

#[utoipa::path(
    get,
    path = "/api/files/{tenant}/{category}/{resource}/{name}",
    params(
        ("tenant" = String, Path, description = "Tenant id"),
        ("category" = String, Path, description = "Resource-scoped category token"),
        ("resource" = String, Path, description = "Resource or request id"),
        ("name" = String, Path, description = "File name")
    ),
    responses(
        (status = 200, description = "File content"),
        (status = 400, description = "Invalid identifier", body = crate::error::ErrorRes),
        (status = 404, description = "File not found", body = crate::error::ErrorRes)
    )
)]
/// Download a file from a resource folder
#[axum::debug_handler]
pub(crate) async fn download_resource_file(
    State(state): State<AppState>,
    AxumPath((tenant, category, resource, name)): AxumPath<(String, String, String, String)>,
) -> Result<Response, ApiError> {
    let key = folder_key(&tenant, &category, Some(&resource))?;
    download(&state, key, name).await
}

#[utoipa::path(
    delete,
    path = "/api/files/{tenant}/{category}/{resource}/{name}",
    params(
        ("tenant" = String, Path, description = "Tenant id"),
        ("category" = String, Path, description = "Resource-scoped category token"),
        ("resource" = String, Path, description = "Resource or request id"),
        ("name" = String, Path, description = "File name")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteFileRes),
        (status = 400, description = "Invalid identifier", body = crate::error::ErrorRes),
        (status = 404, description = "File not found", body = crate::error::ErrorRes)
    )
)]
/// Delete a file from a resource folder
#[axum::debug_handler]
pub(crate) async fn delete_resource_file(
    State(state): State<AppState>,
    AxumPath((tenant, category, resource, name)): AxumPath<(String, String, String, String)>,
) -> Result<Json<DeleteFileRes>, ApiError> {
    let key = folder_key(&tenant, &category, Some(&resource))?;
    delete_file(&state, key, name).await
}

fn parse_category(category: &str) -> Result<Category, ApiError> {
    category.parse().map_err(files_error)
}

fn folder_key(tenant: &str, category: &str, resource: Option<&str>) -> Result<FolderKey, ApiError> {
    let category = parse_category(category)?;
    FolderKey::parse(category, tenant, resource).map_err(files_error)
}

/// Runs a storage call on the blocking pool.
async fn run_blocking<T, F>(service: &FilesService, f: F) -> Result<T, ApiError>
where
    F: FnOnce(FilesService) -> FilesResult<T> + Send + 'static,
    T: Send + 'static,
{
    let service = service.clone();
    tokio::task::spawn_blocking(move || f(service))
        .await
        .map_err(join_error)?
        .map_err(files_error)
}

async fn list_files(state: &AppState, key: FolderKey) -> Result<Json<ListFilesRes>, ApiError> {
    let listed_key = key.clone();
    let files = run_blocking(&state.files, move |s| s.list_metadata(&listed_key)).await?;
    Ok(Json(ListFilesRes {
        files: files.into_iter().map(|m| FileInfo::new(&key, m)).collect(),
    }))
}

async fn delete_folder(state: &AppState, key: FolderKey) -> Result<Json<MessageRes>, ApiError> {
    let message = run_blocking(&state.files, move |s| s.delete_category_folder(&key)).await?;
    Ok(Json(MessageRes { message }))
}

async fn delete_file(
    state: &AppState,
    key: FolderKey,
    name: String,
) -> Result<Json<DeleteFileRes>, ApiError> {
    let deleted = run_blocking(&state.files, move |s| s.delete_one(&key, &name)).await?;
    Ok(Json(DeleteFileRes {
        file_name: deleted.to_string(),
    }))
}

async fn download(state: &AppState, key: FolderKey, name: String) -> Result<Response, ApiError> {
    let handle = run_blocking(&state.files, move |s| s.load(&key, &name)).await?;

    let content_type = handle.media_type.unwrap_or("application/octet-stream");
    let disposition = content_disposition(handle.file_name.as_str());
    let stream = ReaderStream::new(tokio::fs::File::from_std(handle.file));

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// Reads the file fields of a multipart request and stores them.
///
/// The summed size is checked against the category limit while reading, so an
/// oversized request is rejected before anything is written.
async fn upload(
    state: &AppState,
    key: FolderKey,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadRes>), ApiError> {
    let limit = state.limits.limit_for(key.category());
    let mut files = Vec::new();
    let mut total = 0usize;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if !field.name().is_some_and(|n| FILE_FIELDS.contains(&n)) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        total = total.saturating_add(bytes.len());
        if total > limit {
            tracing::warn!(folder = %key, limit, "upload rejected: too large");
            return Err(api_error(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!(
                    "upload exceeds the {limit} byte limit for {}",
                    key.category().label()
                ),
            ));
        }
        files.push(IncomingFile {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "request has no `file` or `files` field",
        ));
    }

    if files.len() == 1 {
        let IncomingFile { file_name, bytes } = files.remove(0);
        let saved = run_blocking(&state.files, move |s| s.save(&key, &file_name, &bytes)).await?;
        let res = UploadRes {
            saved: vec![saved.to_string()],
            failed: Vec::new(),
        };
        return Ok((StatusCode::CREATED, Json(res)));
    }

    let outcomes = run_blocking(&state.files, move |s| s.save_many(&key, &files)).await?;
    let mut res = UploadRes::default();
    for SaveOutcome { file_name, result } in outcomes {
        match result {
            Ok(name) => res.saved.push(name.to_string()),
            Err(e) => res.failed.push(FailedUpload {
                file_name,
                error: e.to_string(),
            }),
        }
    }

    let status = if res.failed.is_empty() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(res)))
}

fn multipart_error(e: MultipartError) -> ApiError {
    api_error(e.status(), e.body_text())
}

fn content_disposition(file_name: &str) -> String {
    let escaped = file_name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("attachment; filename=\"{escaped}\"")
}
