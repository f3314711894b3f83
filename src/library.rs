//! Track catalogs.
//!
//! A catalog produces the ordered list of tracks shown in the UI. Three
//! sources exist: a TOML manifest, a directory scan and a remote metadata
//! service. The controller only ever sees the resulting `Track` values.

mod catalog;
mod display;
mod manifest;
mod model;
mod remote;
mod scan;

pub use catalog::{Catalog, CatalogError, open_catalog};
pub use display::display_name;
pub use manifest::{MANIFEST_FILE, ManifestCatalog};
pub use model::{SourceLocator, Track, TrackId};
pub use remote::RemoteCatalog;
pub use scan::DirCatalog;
