use tracing::{info, warn};

use crate::app::App;
use crate::config;
use crate::library::open_catalog;

/// Open the catalog for `target` and build the initial app model.
///
/// Catalog failures are not fatal: the list starts empty and the error is
/// shown in the status line.
pub fn build_app(target: &str, settings: &config::Settings) -> App {
    let catalog = match open_catalog(target, &settings.catalog) {
        Ok(c) => c,
        Err(e) => {
            warn!(target, error = %e, "could not open catalog");
            let mut app = App::new(Vec::new());
            app.notice = Some(e.to_string());
            return app;
        }
    };

    let label = catalog.describe();
    let mut app = match catalog.tracks() {
        Ok(tracks) => {
            info!(catalog = %label, tracks = tracks.len(), "catalog loaded");
            App::new(tracks)
        }
        Err(e) => {
            warn!(catalog = %label, error = %e, "catalog listing failed");
            let mut app = App::new(Vec::new());
            app.notice = Some(e.to_string());
            app
        }
    };
    app.set_catalog_label(label);
    app
}
