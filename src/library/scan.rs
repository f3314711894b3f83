use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::CatalogSettings;

use super::catalog::{Catalog, CatalogError};
use super::display::display_name;
use super::model::{SourceLocator, Track};

/// Catalog built by walking a directory for audio files.
pub struct DirCatalog {
    dir: PathBuf,
    settings: CatalogSettings,
}

impl DirCatalog {
    pub fn new(dir: impl Into<PathBuf>, settings: CatalogSettings) -> Self {
        Self {
            dir: dir.into(),
            settings,
        }
    }
}

impl Catalog for DirCatalog {
    fn tracks(&self) -> Result<Vec<Track>, CatalogError> {
        if !self.dir.is_dir() {
            return Err(CatalogError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", self.dir.display()),
            )));
        }
        Ok(scan(&self.dir, &self.settings))
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

fn is_audio_file(path: &Path, settings: &CatalogSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Loop material is usually named after it ("perc_loop 6 128bpm").
fn looks_like_loop(name: &str) -> bool {
    name.to_ascii_lowercase().contains("loop")
}

pub fn scan(dir: &Path, settings: &CatalogSettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file()
            || (!settings.include_hidden && is_hidden(path))
            || !is_audio_file(path, settings)
        {
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        let mut title = stem.clone();
        let mut author: Option<String> = None;
        let mut declared_length: Option<Duration> = None;

        if let Ok(tagged) = lofty::read_from_path(path) {
            declared_length = Some(tagged.properties().duration());

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.title().filter(|v| !v.trim().is_empty()) {
                    title = v.trim().to_string();
                }
                if let Some(v) = tag.artist().filter(|v| !v.trim().is_empty()) {
                    author = Some(v.trim().to_string());
                }
            }
        }

        tracks.push(Track {
            id: 0,
            display: display_name(&title, author.as_deref()),
            loop_default: looks_like_loop(&stem),
            source: SourceLocator::Path(path.to_path_buf()),
            title,
            author,
            declared_length,
            key: None,
            bpm: None,
            waveform: None,
        });
    }

    tracks.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    for (i, t) in tracks.iter_mut().enumerate() {
        t.id = i as u64 + 1;
    }
    debug!(dir = %dir.display(), count = tracks.len(), "directory scanned");
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = CatalogSettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.wav"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn scan_filters_non_audio_sorts_and_numbers_tracks() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.WAV"), b"not a real wav").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let tracks = scan(dir.path(), &CatalogSettings::default());
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "A");
        assert_eq!(tracks[0].id, 1);
        assert_eq!(tracks[1].title, "b");
        assert_eq!(tracks[1].id, 2);
        assert!(tracks.iter().all(|t| t.declared_length.is_none()));
    }

    #[test]
    fn scan_marks_loop_named_files_as_looping() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("perc_loop 6 128bpm.wav"), b"x").unwrap();
        fs::write(dir.path().join("KICK.wav"), b"x").unwrap();

        let tracks = scan(dir.path(), &CatalogSettings::default());
        let kick = tracks.iter().find(|t| t.title == "KICK").unwrap();
        let perc = tracks.iter().find(|t| t.title.starts_with("perc")).unwrap();
        assert!(!kick.loop_default);
        assert!(perc.loop_default);
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.wav"), b"not real").unwrap();
        fs::write(dir.path().join("visible.wav"), b"not real").unwrap();

        let settings = CatalogSettings {
            include_hidden: false,
            ..CatalogSettings::default()
        };
        let tracks = scan(dir.path(), &settings);

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].display, "visible");
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.wav"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.wav"), b"not real").unwrap();

        let settings = CatalogSettings {
            recursive: false,
            ..CatalogSettings::default()
        };
        let tracks = scan(dir.path(), &settings);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].display, "root");
    }

    #[test]
    fn dir_catalog_rejects_missing_directory() {
        let dir = tempdir().unwrap();
        let catalog = DirCatalog::new(dir.path().join("nope"), CatalogSettings::default());
        assert!(matches!(catalog.tracks(), Err(CatalogError::Io(_))));
    }
}
