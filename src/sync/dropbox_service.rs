// Dropbox Service - OAuth refresh token plus the HTTP API v2 endpoints the relay needs

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use super::error::{SyncError, SyncResult};
use super::oauth_client::{Credentials, OAuthClient};
use super::remote_path::RemotePath;
use super::remote_store::{EntryKind, RemoteEntry, RemoteStore};
use super::sync_config::SyncSettings;

const API_ARG_HEADER: &str = "Dropbox-API-Arg";

#[derive(Debug, Serialize)]
struct PathArg<'a> {
    path: &'a str,
}

#[derive(Debug, Serialize)]
struct ListFolderArg<'a> {
    path: &'a str,
    recursive: bool,
    include_deleted: bool,
}

#[derive(Debug, Serialize)]
struct ListFolderContinueArg<'a> {
    cursor: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListFolderResult {
    entries: Vec<Metadata>,
    cursor: String,
    has_more: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
enum Metadata {
    File {
        name: String,
        path_lower: Option<String>,
        path_display: Option<String>,
        size: u64,
    },
    Folder {
        name: String,
        path_lower: Option<String>,
        path_display: Option<String>,
    },
    Deleted {
        name: String,
    },
}

impl Metadata {
    fn into_entry(self) -> Option<RemoteEntry> {
        let (kind, name, path_lower, path_display, size) = match self {
            Metadata::File {
                name,
                path_lower,
                path_display,
                size,
            } => (EntryKind::File, name, path_lower, path_display, Some(size)),
            Metadata::Folder {
                name,
                path_lower,
                path_display,
            } => (EntryKind::Folder, name, path_lower, path_display, None),
            Metadata::Deleted { name } => {
                debug!("Skipping deleted entry: {}", name);
                return None;
            }
        };

        // Entries outside the user's namespace carry no path
        let path_display = path_display?;
        let path_lower = path_lower.unwrap_or_else(|| path_display.to_lowercase());
        Some(RemoteEntry {
            kind,
            name,
            path_lower,
            path_display,
            size,
        })
    }
}

#[derive(Debug, Serialize)]
struct CommitInfo<'a> {
    path: &'a str,
    mode: &'static str,
    autorename: bool,
    mute: bool,
}

impl<'a> CommitInfo<'a> {
    fn overwrite(path: &'a str) -> Self {
        Self {
            path,
            mode: "overwrite",
            autorename: false,
            mute: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct UploadSessionStartArg {
    close: bool,
}

#[derive(Debug, Deserialize)]
struct UploadSessionStartResult {
    session_id: String,
}

#[derive(Debug, Serialize)]
struct UploadSessionCursor<'a> {
    session_id: &'a str,
    offset: u64,
}

#[derive(Debug, Serialize)]
struct UploadSessionAppendArg<'a> {
    cursor: UploadSessionCursor<'a>,
    close: bool,
}

#[derive(Debug, Serialize)]
struct UploadSessionFinishArg<'a> {
    cursor: UploadSessionCursor<'a>,
    commit: CommitInfo<'a>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_summary: Option<String>,
}

/// Dropbox client used by the relay workflows
pub struct DropboxService {
    oauth_client: OAuthClient,
    http_client: reqwest::Client,
    api_base: String,
    content_base: String,
    single_upload_limit: u64,
    upload_chunk_size: usize,
}

impl DropboxService {
    /// Create new Dropbox service
    pub fn new(credentials: Credentials, settings: &SyncSettings) -> SyncResult<Self> {
        credentials.validate()?;
        settings.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(SyncError::http)?;

        info!(
            "Initializing Dropbox service (api: {})",
            settings.endpoints.api_base
        );

        Ok(Self {
            oauth_client: OAuthClient::new(
                credentials,
                settings.endpoints.token_url.clone(),
                http_client.clone(),
            ),
            http_client,
            api_base: settings.endpoints.api_base.trim_end_matches('/').to_string(),
            content_base: settings
                .endpoints
                .content_base
                .trim_end_matches('/')
                .to_string(),
            single_upload_limit: settings.single_upload_limit,
            upload_chunk_size: settings.upload_chunk_size,
        })
    }

    /// JSON-in, JSON-out call on the API host
    async fn rpc<A, R>(&mut self, endpoint: &str, arg: &A) -> SyncResult<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let access_token = self.oauth_client.access_token().await?;

        let response = self
            .http_client
            .post(format!("{}/{}", self.api_base, endpoint))
            .bearer_auth(access_token)
            .json(arg)
            .send()
            .await
            .map_err(SyncError::http)?;

        let response = Self::check_status(endpoint, response).await?;
        let body = response.bytes().await.map_err(SyncError::http)?;
        serde_json::from_slice(&body).map_err(SyncError::json)
    }

    /// Call on the content host: argument in the header, payload in the body
    async fn content_request<A>(
        &mut self,
        endpoint: &str,
        arg: &A,
        body: Option<Vec<u8>>,
    ) -> SyncResult<Response>
    where
        A: Serialize + ?Sized,
    {
        let access_token = self.oauth_client.access_token().await?;
        let arg_json = serde_json::to_string(arg).map_err(SyncError::json)?;

        let mut request = self
            .http_client
            .post(format!("{}/{}", self.content_base, endpoint))
            .bearer_auth(access_token)
            .header(API_ARG_HEADER, http_header_safe_json(&arg_json));

        if let Some(bytes) = body {
            request = request
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(bytes);
        }

        let response = request.send().await.map_err(SyncError::http)?;
        Self::check_status(endpoint, response).await
    }

    async fn content_json<A, R>(&mut self, endpoint: &str, arg: &A, body: Vec<u8>) -> SyncResult<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.content_request(endpoint, arg, Some(body)).await?;
        let bytes = response.bytes().await.map_err(SyncError::http)?;
        serde_json::from_slice(&bytes).map_err(SyncError::json)
    }

    async fn check_status(endpoint: &str, response: Response) -> SyncResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        let summary = serde_json::from_str::<ApiErrorBody>(&error_text)
            .ok()
            .and_then(|body| body.error_summary)
            .unwrap_or(error_text);

        Err(SyncError::remote(endpoint, status.as_u16(), summary))
    }

    /// Upload through an upload session; used above the single-request limit.
    /// Chunks are read from `source` one at a time.
    async fn upload_in_session(&mut self, path: &RemotePath, source: &Path, size: u64) -> SyncResult<()> {
        let chunk_size = self.upload_chunk_size as u64;
        let mut file = File::open(source)
            .await
            .map_err(|e| SyncError::io(source, e))?;

        info!(
            "Uploading {} bytes to {} in {} chunk(s)",
            size,
            path,
            size.div_ceil(chunk_size).max(1)
        );

        let first = read_chunk(&mut file, source, size.min(chunk_size)).await?;
        let mut offset = first.len() as u64;
        let started: UploadSessionStartResult = self
            .content_json(
                "files/upload_session/start",
                &UploadSessionStartArg { close: false },
                first,
            )
            .await?;
        let session_id = started.session_id;

        while size - offset > chunk_size {
            let chunk = read_chunk(&mut file, source, chunk_size).await?;
            let arg = UploadSessionAppendArg {
                cursor: UploadSessionCursor {
                    session_id: &session_id,
                    offset,
                },
                close: false,
            };
            self.content_request("files/upload_session/append_v2", &arg, Some(chunk))
                .await?;
            offset += chunk_size;
            debug!("Appended chunk, offset now {}", offset);
        }

        let last = read_chunk(&mut file, source, size - offset).await?;
        let arg = UploadSessionFinishArg {
            cursor: UploadSessionCursor {
                session_id: &session_id,
                offset,
            },
            commit: CommitInfo::overwrite(path.as_api_path()),
        };
        let _: serde_json::Value = self
            .content_json("files/upload_session/finish", &arg, last)
            .await?;
        Ok(())
    }
}

async fn read_chunk(file: &mut File, source: &Path, len: u64) -> SyncResult<Vec<u8>> {
    let mut buf = vec![0u8; len as usize];
    file.read_exact(&mut buf)
        .await
        .map_err(|e| SyncError::io(source, e))?;
    Ok(buf)
}

/// Write the response body to `partial` chunk by chunk.
async fn stream_to_file(mut response: Response, partial: &Path) -> SyncResult<u64> {
    let mut file = File::create(partial)
        .await
        .map_err(|e| SyncError::io(partial, e))?;

    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(SyncError::http)? {
        file.write_all(&chunk)
            .await
            .map_err(|e| SyncError::io(partial, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| SyncError::io(partial, e))?;
    Ok(written)
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

#[async_trait]
impl RemoteStore for DropboxService {
    async fn list_folder(
        &mut self,
        path: &RemotePath,
        recursive: bool,
    ) -> SyncResult<Vec<RemoteEntry>> {
        info!("Listing remote folder: {}", path);

        let arg = ListFolderArg {
            path: path.as_api_path(),
            recursive,
            include_deleted: false,
        };

        let mut page: ListFolderResult = match self.rpc("files/list_folder", &arg).await {
            Ok(page) => page,
            Err(err) if err.is_remote_not_found() => {
                info!("Remote folder {} does not exist", path);
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let mut entries = Vec::new();
        loop {
            entries.extend(page.entries.into_iter().filter_map(Metadata::into_entry));

            if !page.has_more {
                break;
            }

            debug!("Fetching next listing page for {}", path);
            let cursor = page.cursor;
            page = self
                .rpc(
                    "files/list_folder/continue",
                    &ListFolderContinueArg { cursor: &cursor },
                )
                .await?;
        }

        info!("Found {} entries under {}", entries.len(), path);
        Ok(entries)
    }

    async fn delete(&mut self, path: &RemotePath) -> SyncResult<()> {
        if path.is_root() {
            return Err(SyncError::invalid_path(
                "remote_path",
                "/",
                "Refusing to delete the Dropbox root",
            ));
        }

        info!("Deleting remote entry: {}", path);
        let _: serde_json::Value = self
            .rpc(
                "files/delete_v2",
                &PathArg {
                    path: path.as_api_path(),
                },
            )
            .await?;
        Ok(())
    }

    async fn download(&mut self, path: &RemotePath, target: &Path) -> SyncResult<u64> {
        info!("Downloading file content: {}", path);

        let response = self
            .content_request(
                "files/download",
                &PathArg {
                    path: path.as_api_path(),
                },
                None,
            )
            .await?;

        let partial = partial_path(target);
        let written = match stream_to_file(response, &partial).await {
            Ok(written) => written,
            Err(err) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(err);
            }
        };
        tokio::fs::rename(&partial, target)
            .await
            .map_err(|e| SyncError::io(target, e))?;

        debug!("Downloaded {} bytes from {}", written, path);
        Ok(written)
    }

    async fn upload(&mut self, path: &RemotePath, source: &Path) -> SyncResult<()> {
        if path.is_root() {
            return Err(SyncError::invalid_path(
                "remote_path",
                "/",
                "Upload destination must name a file",
            ));
        }

        let size = tokio::fs::metadata(source)
            .await
            .map_err(|e| SyncError::io(source, e))?
            .len();
        if size > self.single_upload_limit {
            return self.upload_in_session(path, source, size).await;
        }

        let content = tokio::fs::read(source)
            .await
            .map_err(|e| SyncError::io(source, e))?;
        info!("Uploading {} bytes to {}", size, path);
        let _: serde_json::Value = self
            .content_json(
                "files/upload",
                &CommitInfo::overwrite(path.as_api_path()),
                content,
            )
            .await?;
        Ok(())
    }
}

/// Dropbox-API-Arg must be ASCII; escape everything else as JSON `\uXXXX`.
fn http_header_safe_json(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    for ch in json.chars() {
        if ch.is_ascii() {
            escaped.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                escaped.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    escaped
}
