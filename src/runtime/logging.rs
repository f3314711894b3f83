use std::error::Error;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;

/// Install the global subscriber. `RUST_LOG` overrides `log.level`.
///
/// Logs only ever go to `log.file`: the terminal belongs to the UI, so
/// without a file nothing is installed and events are dropped.
pub fn init(settings: &LogSettings) -> Result<(), Box<dyn Error>> {
    let Some(path) = &settings.file else {
        return Ok(());
    };

    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(&settings.level)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| e as Box<dyn Error>)?;
    Ok(())
}
