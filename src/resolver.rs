use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncRead;

/// Failure classification produced directly by the filesystem layer.
///
/// The router maps `NotFound` to 404 and everything else to 500; nothing
/// below it inspects error messages to decide a status code.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolved location of a requested file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub absolute_path: PathBuf,
    pub extension: String,
}

/// An open read stream paired with the extension it was resolved under.
/// Single consumer; dropping it releases the underlying handle.
pub struct FileStream<R> {
    pub stream: R,
    pub extension: String,
}

/// The router's filesystem collaborator. Tests substitute a fake source
/// instead of patching live objects.
#[allow(async_fn_in_trait)]
pub trait StreamSource {
    type Reader: AsyncRead + Send + Unpin + 'static;

    async fn open_stream(&self, relative_path: &str) -> Result<FileStream<Self::Reader>, FetchError>;
}

/// Translates a logical file reference into a verified location under the
/// public root and an open read stream for it.
pub struct FileResolver {
    public_root: PathBuf,
}

impl FileResolver {
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        Self {
            public_root: public_root.into(),
        }
    }

    /// Join the reference onto the public root, check it is an accessible
    /// file, and derive its extension. Does not open the file.
    pub async fn resolve_info(&self, relative_path: &str) -> Result<FileInfo, FetchError> {
        let relative = confined(relative_path)?;
        let absolute_path = self.public_root.join(relative);

        let metadata = fs::metadata(&absolute_path)
            .await
            .map_err(|e| classify(e, &absolute_path))?;
        if !metadata.is_file() {
            return Err(FetchError::NotFound(absolute_path.display().to_string()));
        }

        let extension = extension_of(&absolute_path);
        Ok(FileInfo {
            absolute_path,
            extension,
        })
    }
}

impl StreamSource for FileResolver {
    type Reader = File;

    /// Resolve, then open positioned at the start. Reads no bytes itself;
    /// draining the stream is the caller's job. A file deleted between the
    /// access check and the open surfaces here, never swallowed.
    async fn open_stream(&self, relative_path: &str) -> Result<FileStream<File>, FetchError> {
        let info = self.resolve_info(relative_path).await?;
        let stream = File::open(&info.absolute_path)
            .await
            .map_err(|e| classify(e, &info.absolute_path))?;
        Ok(FileStream {
            stream,
            extension: info.extension,
        })
    }
}

/// Confine the reference to the public root: strip the leading slashes a
/// request path carries, then reject anything that is not a plain
/// descending path (parent-dir segments, absolute components).
fn confined(relative_path: &str) -> Result<&Path, FetchError> {
    let trimmed = relative_path.trim_start_matches('/');
    let path = Path::new(trimmed);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if trimmed.is_empty() || escapes {
        return Err(FetchError::NotFound(relative_path.to_string()));
    }
    Ok(path)
}

fn classify(err: std::io::Error, path: &Path) -> FetchError {
    match err.kind() {
        ErrorKind::NotFound => FetchError::NotFound(path.display().to_string()),
        _ => FetchError::Io(err),
    }
}

/// Extension of the final path segment, including the leading dot.
/// Empty when there is no dot, or when the only dot is the leading one
/// of a hidden file.
fn extension_of(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_string(),
        _ => String::new(),
    }
}
