use std::path::{Path, PathBuf};

use crate::config::{CatalogSettings, CatalogSource};

use super::manifest::{MANIFEST_FILE, ManifestCatalog};
use super::model::Track;
use super::remote::RemoteCatalog;
use super::scan::DirCatalog;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog request failed: {0}")]
    Http(String),

    #[error("invalid catalog data: {0}")]
    Parse(String),
}

/// An ordered source of tracks.
pub trait Catalog {
    fn tracks(&self) -> Result<Vec<Track>, CatalogError>;

    /// Short human-readable origin, shown in the status line.
    fn describe(&self) -> String;
}

/// Pick a catalog for the command-line `target` according to `settings`.
///
/// In `auto` mode a URL means the remote service, a directory holding a
/// manifest (or a manifest file itself) means the manifest, and any other
/// directory is scanned.
pub fn open_catalog(
    target: &str,
    settings: &CatalogSettings,
) -> Result<Box<dyn Catalog>, CatalogError> {
    let is_url = target.starts_with("http://") || target.starts_with("https://");

    let catalog: Box<dyn Catalog> = match settings.source {
        CatalogSource::Remote => {
            let base = if is_url { target } else { settings.remote_base_url.as_str() };
            Box::new(RemoteCatalog::new(base)?)
        }
        CatalogSource::Manifest => Box::new(ManifestCatalog::new(manifest_path(Path::new(target)))),
        CatalogSource::Directory => Box::new(DirCatalog::new(target, settings.clone())),
        CatalogSource::Auto => {
            if is_url {
                Box::new(RemoteCatalog::new(target)?)
            } else {
                let manifest = manifest_path(Path::new(target));
                if manifest.is_file() {
                    Box::new(ManifestCatalog::new(manifest))
                } else {
                    Box::new(DirCatalog::new(target, settings.clone()))
                }
            }
        }
    };
    Ok(catalog)
}

fn manifest_path(target: &Path) -> PathBuf {
    if target.is_dir() {
        target.join(MANIFEST_FILE)
    } else {
        target.to_path_buf()
    }
}
