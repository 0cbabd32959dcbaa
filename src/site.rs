use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;

use crate::DirectoryView;
use crate::Error;
use crate::native_fs::DirLister;
use crate::path::RequestPath;

/// File served in place of a listing when a directory holds one.
pub const INDEX_FILE: &str = "index.html";

/// What a request path resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Raw bytes of a file.
    File(Vec<u8>),
    /// Classified listing of a directory.
    Listing(DirectoryView),
}

/// A directory tree served read-only from `base_dir`.
#[derive(Clone, Debug)]
pub struct Site {
    base_dir: Arc<PathBuf>,
}

impl Site {
    /// Creates a site rooted at `base_dir`.
    pub fn new(base_dir: PathBuf) -> Self {
        Site {
            base_dir: Arc::new(base_dir),
        }
    }

    /// Converts a request path to an absolute PathBuf based on the
    /// base_dir.
    pub fn as_abs_path(&self, relative: &RequestPath) -> PathBuf {
        relative.append_to(&self.base_dir)
    }

    /// Resolves the path part of a request URI.
    ///
    /// A directory is served by its `index.html` when that exists and is not
    /// itself a directory, and by its listing otherwise. Anything else is
    /// served as raw bytes.
    pub async fn resolve(&self, request_path: &str) -> Result<Resolved, Error> {
        // The root may vanish or become unreadable while serving. That fails
        // this request only.
        fs::metadata(self.base_dir.as_path())
            .await
            .map_err(|e| Error::Unreadable {
                what: self.base_dir.display().to_string(),
                how: e.to_string(),
            })?;

        let relative = RequestPath::parse(request_path);
        let full_path = self.as_abs_path(&relative);

        fs::symlink_metadata(&full_path)
            .await
            .map_err(|e| Error::from_io(&full_path, &e))?;
        let metadata = fs::metadata(&full_path)
            .await
            .map_err(|e| Error::from_io(&full_path, &e))?;

        if !metadata.is_dir() {
            return Ok(Resolved::File(read_file(&full_path).await?));
        }

        let index = full_path.join(INDEX_FILE);
        match fs::metadata(&index).await {
            Ok(index_meta) if !index_meta.is_dir() => {
                log::debug!("serving {} for {relative}", index.display());
                Ok(Resolved::File(read_file(&index).await?))
            }
            _ => {
                let view = DirLister::create(self.base_dir.as_path())
                    .list(&full_path)
                    .await?;
                Ok(Resolved::Listing(view))
            }
        }
    }
}

async fn read_file(path: &std::path::Path) -> Result<Vec<u8>, Error> {
    fs::read(path).await.map_err(|e| Error::from_io(path, &e))
}
