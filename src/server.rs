//! HTTP surface.
//!
//! | Route | Behaviour |
//! |---|---|
//! | `GET /` | redirect to `/gallery` |
//! | `GET /gallery` | listing, thumbnails where available |
//! | `GET /image-detail?image=NAME` | detail page with wraparound prev/next |
//! | `GET /download?image=NAME` | original as an attachment |
//! | `GET /download-all` | zip of every image, streamed then deleted |
//! | `GET /images/{name}` | original, inline |
//! | `GET /thumbnails/{name}` | thumbnail, or original when there is none |
//!
//! Every request re-indexes the gallery root; the only shared state is the
//! immutable [`AppState`]. Filesystem work runs on the blocking pool.
//!
//! A bad, stale or non-image name on the detail, download and `/images`
//! routes redirects to `/gallery`. A missing thumbnail target is a 404. A
//! failed bulk download answers with a plain-text 500.

use crate::archive;
use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::render::{self, DetailPage, GalleryItem};
use crate::types::{ImageEntry, ImageMetadata, ResolvedPath};
use crate::{index, metadata, navigation, resolve, thumbnail};
use axum::Router;
use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path as AxumPath, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use futures_util::StreamExt;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub const ARCHIVE_FAILED_MESSAGE: &str = "Failed to create zip file";

pub type SharedState = Arc<AppState>;

/// Immutable per-server state.
#[derive(Debug)]
pub struct AppState {
    /// Absolute gallery root.
    pub root: PathBuf,
    pub config: GalleryConfig,
}

impl AppState {
    pub fn new(root: PathBuf, config: GalleryConfig) -> SharedState {
        Arc::new(Self { root, config })
    }

    fn thumbnail_dir(&self) -> PathBuf {
        self.config.thumbnail_path(&self.root)
    }

    fn list(&self) -> Result<Vec<ImageEntry>, GalleryError> {
        index::list(&self.root, &self.config.thumbnails.dir)
    }
}

/// Raw query pairs. Extracted as a `Result` so a malformed query string
/// reaches the handler instead of becoming a 400.
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// The `image` parameter. When it is repeated the last value wins; a query
/// string that does not parse counts as no parameter.
fn image_param(query: QueryPairs) -> Option<String> {
    let Query(pairs) = query
        .map_err(|e| warn!(error = %e, "unparseable query string"))
        .ok()?;
    pairs
        .into_iter()
        .rev()
        .find(|(key, _)| key == "image")
        .map(|(_, value)| value)
}

/// An `image` parameter that passed every check, with the snapshot it was
/// checked against.
struct Located {
    resolved: ResolvedPath,
    entries: Vec<ImageEntry>,
    metadata: ImageMetadata,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/gallery") }))
        .route("/gallery", get(gallery_handler))
        .route("/image-detail", get(detail_handler))
        .route("/download", get(download_handler))
        .route("/download-all", get(download_all_handler))
        .route("/images/{name}", get(image_handler))
        .route("/thumbnails/{name}", get(thumbnail_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: SharedState, addr: SocketAddr) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        root = %state.root.display(),
        "serving gallery on http://{}/gallery",
        listener.local_addr()?
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

// ============================================================================
// Handlers
// ============================================================================

async fn gallery_handler(State(state): State<SharedState>) -> Response {
    let listing = Arc::clone(&state);
    match blocking(move || gallery_items(&listing)).await {
        Ok(items) => {
            let page = render::render_gallery(&state.config.title, state.config.tip_url.as_deref(), &items);
            Html(page.into_string()).into_response()
        }
        Err(e) => internal_error(e),
    }
}

async fn detail_handler(State(state): State<SharedState>, query: QueryPairs) -> Response {
    let image = image_param(query);
    let result = blocking(move || {
        let located = locate(&state, image.as_deref())?;
        let neighbors = navigation::neighbors(&located.entries, &located.resolved.safe_name)?;
        let page = render::render_detail(&DetailPage {
            name: &located.resolved.safe_name,
            metadata: &located.metadata,
            neighbors: &neighbors,
        });
        Ok(page.into_string())
    })
    .await;

    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => recover(e),
    }
}

async fn download_handler(State(state): State<SharedState>, query: QueryPairs) -> Response {
    download(state, image_param(query)).await.unwrap_or_else(recover)
}

async fn download(state: SharedState, image: Option<String>) -> Result<Response, GalleryError> {
    let located = blocking(move || locate(&state, image.as_deref())).await?;
    let mut headers = HeaderMap::new();
    insert_content_headers(&mut headers, &located.metadata.mime_type, located.metadata.byte_size);
    headers.insert(
        header::CONTENT_DISPOSITION,
        attachment(&located.resolved.safe_name),
    );
    stream_file(&located.resolved.absolute_path, headers).await
}

async fn download_all_handler(State(state): State<SharedState>) -> Response {
    match archive_response(state).await {
        Ok(response) => response,
        Err(e) => {
            error!(kind = e.kind(), error = %e, "bulk download failed");
            (StatusCode::INTERNAL_SERVER_ERROR, ARCHIVE_FAILED_MESSAGE).into_response()
        }
    }
}

async fn image_handler(
    State(state): State<SharedState>,
    AxumPath(name): AxumPath<String>,
) -> Response {
    original(state, name).await.unwrap_or_else(recover)
}

async fn original(state: SharedState, name: String) -> Result<Response, GalleryError> {
    let located = blocking(move || locate(&state, Some(&name))).await?;
    let mut headers = HeaderMap::new();
    insert_content_headers(&mut headers, &located.metadata.mime_type, located.metadata.byte_size);
    stream_file(&located.resolved.absolute_path, headers).await
}

async fn thumbnail_handler(
    State(state): State<SharedState>,
    AxumPath(name): AxumPath<String>,
) -> Response {
    display_image(state, name).await.unwrap_or_else(not_found)
}

async fn display_image(state: SharedState, name: String) -> Result<Response, GalleryError> {
    let (path, meta) = blocking(move || {
        let resolved = resolve::resolve(&name, &state.root)?;
        let entries = state.list()?;
        let entry = index::find(&entries, &resolved.safe_name)
            .ok_or_else(|| GalleryError::NotFound(resolved.safe_name.clone()))?;
        let selection = thumbnail::select(entry, &state.thumbnail_dir(), &state.root);
        match metadata::read(selection.path()) {
            Ok(meta) => Ok((selection.path().to_path_buf(), meta)),
            Err(e) if selection.is_thumbnail() => {
                warn!(image = entry.name(), error = %e, "unreadable thumbnail, serving original");
                let original = entry.path_in(&state.root);
                let meta = metadata::read(&original)?;
                Ok((original, meta))
            }
            Err(e) => Err(e),
        }
    })
    .await?;
    let mut headers = HeaderMap::new();
    insert_content_headers(&mut headers, &meta.mime_type, meta.byte_size);
    stream_file(&path, headers).await
}

// ============================================================================
// Request pipeline
// ============================================================================

/// Listing tiles for the gallery page: one per indexed image, each pointing
/// at its thumbnail when one exists.
fn gallery_items(state: &AppState) -> Result<Vec<GalleryItem>, GalleryError> {
    let thumbnail_dir = state.thumbnail_dir();
    let items = state
        .list()?
        .iter()
        .map(|entry| GalleryItem {
            name: entry.name().to_string(),
            display_url: thumbnail::select(entry, &thumbnail_dir, &state.root).url(entry),
        })
        .collect();
    Ok(items)
}

/// Turn the raw `image` parameter into a checked target: resolved inside
/// the root, present in a fresh index, and decodable as an image.
fn locate(state: &AppState, raw: Option<&str>) -> Result<Located, GalleryError> {
    let raw = raw.ok_or_else(|| GalleryError::InvalidPath(String::new()))?;
    let resolved = resolve::resolve(raw, &state.root)?;
    let entries = state.list()?;
    if index::find(&entries, &resolved.safe_name).is_none() {
        return Err(GalleryError::NotFound(resolved.safe_name));
    }
    let metadata = metadata::read(&resolved.absolute_path)?;
    Ok(Located {
        resolved,
        entries,
        metadata,
    })
}

async fn archive_response(state: SharedState) -> Result<Response, GalleryError> {
    let job = blocking(move || {
        let entries = state.list()?;
        archive::build(
            &entries,
            &state.root,
            &state.config.archive_work_dir(),
            state.config.archive.compression,
            chrono::Local::now(),
        )
    })
    .await?;

    let file = tokio::fs::File::open(job.path()).await?;

    let mut headers = HeaderMap::new();
    insert_content_headers(&mut headers, "application/zip", job.byte_size());
    headers.insert(header::CONTENT_DISPOSITION, attachment(job.download_name()));

    // The temp file lives exactly as long as the body stream: dropped after
    // the last chunk or when the client goes away.
    let guard = job.into_temp_path();
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _held = &guard;
        chunk
    });

    Ok((StatusCode::OK, headers, Body::from_stream(stream)).into_response())
}

// ============================================================================
// Response helpers
// ============================================================================

async fn blocking<T, F>(f: F) -> Result<T, GalleryError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, GalleryError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| GalleryError::Io(io::Error::other(e)))?
}

async fn stream_file(path: &Path, headers: HeaderMap) -> Result<Response, GalleryError> {
    let file = tokio::fs::File::open(path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => GalleryError::NotFound(path.display().to_string()),
        _ => GalleryError::Io(e),
    })?;
    let body = Body::from_stream(ReaderStream::new(file));
    Ok((StatusCode::OK, headers, body).into_response())
}

fn insert_content_headers(headers: &mut HeaderMap, mime: &str, len: u64) {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
}

/// `Content-Disposition: attachment` for a file name.
///
/// Plain ASCII names are quoted as-is. Anything else gets an ASCII fallback
/// plus an RFC 5987 `filename*` carrying the exact UTF-8 name.
pub fn attachment(name: &str) -> HeaderValue {
    let plain = name
        .chars()
        .all(|c| c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\'));
    let value = if plain {
        format!("attachment; filename=\"{name}\"")
    } else {
        let fallback: String = name
            .chars()
            .map(|c| match c {
                ' ' => ' ',
                c if c.is_ascii_graphic() && c != '"' && c != '\\' => c,
                _ => '_',
            })
            .collect();
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(name)
        )
    };
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// User-input failures go back to the listing; anything else is a 500.
fn recover(e: GalleryError) -> Response {
    if e.is_user_input() {
        warn!(kind = e.kind(), error = %e, "rejected image request, redirecting to gallery");
        Redirect::to("/gallery").into_response()
    } else {
        internal_error(e)
    }
}

fn not_found(e: GalleryError) -> Response {
    if e.is_user_input() {
        warn!(kind = e.kind(), error = %e, "image not served");
        (StatusCode::NOT_FOUND, "Not found").into_response()
    } else {
        internal_error(e)
    }
}

fn internal_error(e: GalleryError) -> Response {
    error!(kind = e.kind(), error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disposition(name: &str) -> String {
        attachment(name).to_str().unwrap().to_string()
    }

    #[test]
    fn ascii_name_is_quoted() {
        assert_eq!(disposition("a b.jpg"), r#"attachment; filename="a b.jpg""#);
    }

    #[test]
    fn quotes_get_fallback_and_extended_name() {
        assert_eq!(
            disposition(r#"say "hi".png"#),
            r#"attachment; filename="say _hi_.png"; filename*=UTF-8''say%20%22hi%22.png"#
        );
    }

    #[test]
    fn unicode_name_uses_extended_parameter() {
        assert_eq!(
            disposition("café.jpg"),
            "attachment; filename=\"caf_.jpg\"; filename*=UTF-8''caf%C3%A9.jpg"
        );
    }

    fn pairs(pairs: &[(&str, &str)]) -> QueryPairs {
        Ok(Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }

    #[test]
    fn image_param_takes_last_value() {
        let query = pairs(&[("image", "a.png"), ("other", "x"), ("image", "b.png")]);
        assert_eq!(image_param(query).as_deref(), Some("b.png"));
    }

    #[test]
    fn image_param_absent() {
        assert_eq!(image_param(pairs(&[("other", "x")])), None);
        assert_eq!(image_param(pairs(&[])), None);
    }

    #[test]
    fn user_input_errors_redirect() {
        let response = recover(GalleryError::NotFound("x.jpg".into()));
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/gallery");
    }

    #[test]
    fn io_errors_are_internal() {
        let response = recover(GalleryError::Io(io::Error::other("disk on fire")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
