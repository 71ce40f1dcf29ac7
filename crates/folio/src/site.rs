//! A minimal static site: the source tree copied into the destination.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use folio_dispatch::{Configuration, ProcessError, Site};
use walkdir::{DirEntry, WalkDir};

const DRAFTS_DIR: &str = "_drafts";

/// Copies publishable files from `source` to `destination`.
///
/// Entries whose name starts with `_` or `.` are private and never copied,
/// with one exception: when drafts are enabled, `_drafts` is published under
/// `drafts/`.
#[derive(Debug, Clone)]
pub struct StaticSite {
    source: PathBuf,
    destination: PathBuf,
    show_drafts: bool,
    written: Vec<PathBuf>,
}

impl StaticSite {
    pub fn new(config: &Configuration) -> Self {
        Self {
            source: config.source(),
            destination: config.destination(),
            show_drafts: config.show_drafts(),
            written: Vec::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Files written by the last `process`, relative to the destination.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn check_paths(&self) -> Result<(PathBuf, PathBuf), ProcessError> {
        if !self.source.is_dir() {
            return Err(ProcessError::fatal(format!(
                "The source directory {} does not exist.",
                self.source.display()
            )));
        }

        let source = absolute(&self.source).context("resolving the source directory")?;
        let destination = absolute(&self.destination).context("resolving the destination directory")?;
        if source.starts_with(&destination) {
            return Err(ProcessError::fatal(
                "Destination directory cannot be or contain the Source directory.",
            ));
        }
        Ok((source, destination))
    }
}

impl Site for StaticSite {
    fn process(&mut self) -> Result<(), ProcessError> {
        let (source, destination) = self.check_paths()?;
        let show_drafts = self.show_drafts;
        self.written.clear();

        fs::create_dir_all(&destination)
            .with_context(|| format!("creating {}", destination.display()))?;
        let destination = destination
            .canonicalize()
            .context("resolving the destination directory")?;

        let walker = WalkDir::new(&source)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| publishable(entry, &destination, show_drafts));

        for entry in walker {
            let entry = entry.context("walking the source directory")?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = output_path(entry.path().strip_prefix(&source).unwrap_or(entry.path()));
            let target = destination.join(&relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::copy(entry.path(), &target).with_context(|| {
                format!("copying {} to {}", entry.path().display(), target.display())
            })?;
            tracing::trace!(path = %relative.display(), "wrote");
            self.written.push(relative);
        }

        tracing::debug!(files = self.written.len(), "site written");
        Ok(())
    }
}

fn publishable(entry: &DirEntry, destination: &Path, show_drafts: bool) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    if entry.path() == destination {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if entry.depth() == 1 && name == DRAFTS_DIR {
        return show_drafts;
    }
    !(name.starts_with('_') || name.starts_with('.'))
}

/// Drafts are published under `drafts/`; everything else keeps its path.
fn output_path(relative: &Path) -> PathBuf {
    match relative.strip_prefix(DRAFTS_DIR) {
        Ok(rest) => Path::new("drafts").join(rest),
        Err(_) => relative.to_path_buf(),
    }
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.exists() {
        path.canonicalize()
    } else {
        std::path::absolute(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_dispatch::OptionsOverride;
    use tempfile::TempDir;

    fn config(source: &Path, extra: OptionsOverride) -> Configuration {
        let mut map = Configuration::defaults().into_map();
        map.insert("source".into(), source.display().to_string().into());
        map.insert(
            "destination".into(),
            source.join("_site").display().to_string().into(),
        );
        map.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        Configuration::from_map(map)
    }

    fn write(root: &Path, relative: &str, body: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_copies_public_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.html", "<h1>hi</h1>");
        write(dir.path(), "css/site.css", "body {}");
        write(dir.path(), "_layouts/default.html", "{{ content }}");
        write(dir.path(), ".hidden", "secret");

        let mut site = StaticSite::new(&config(dir.path(), OptionsOverride::new()));
        site.process().unwrap();

        let out = dir.path().join("_site");
        assert_eq!(fs::read_to_string(out.join("index.html")).unwrap(), "<h1>hi</h1>");
        assert!(out.join("css/site.css").is_file());
        assert!(!out.join("_layouts").exists());
        assert!(!out.join(".hidden").exists());
        assert_eq!(
            site.written(),
            &[PathBuf::from("css/site.css"), PathBuf::from("index.html")]
        );
    }

    #[test]
    fn test_second_build_skips_previous_output() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.html", "x");
        let custom = dir.path().join("public");
        let cfg = config(
            dir.path(),
            OptionsOverride::new().with("destination", custom.display().to_string()),
        );

        StaticSite::new(&cfg).process().unwrap();
        let mut again = StaticSite::new(&cfg);
        again.process().unwrap();

        assert_eq!(again.written(), &[PathBuf::from("index.html")]);
        assert!(!custom.join("public").exists());
    }

    #[test]
    fn test_drafts_only_when_enabled() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "_drafts/idea.md", "soon");

        let mut hidden = StaticSite::new(&config(dir.path(), OptionsOverride::new()));
        hidden.process().unwrap();
        assert!(hidden.written().is_empty());

        let mut shown = StaticSite::new(&config(
            dir.path(),
            OptionsOverride::new().with("show_drafts", true),
        ));
        shown.process().unwrap();
        assert_eq!(shown.written(), &[PathBuf::from("drafts/idea.md")]);
        assert!(dir.path().join("_site/drafts/idea.md").is_file());
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut site = StaticSite::new(&config(&dir.path().join("nope"), OptionsOverride::new()));

        let err = site.process().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_destination_equal_to_source_is_fatal() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().display().to_string();
        let mut site = StaticSite::new(&config(
            dir.path(),
            OptionsOverride::new().with("destination", source),
        ));

        let err = site.process().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Destination directory cannot be or contain the Source directory."
        );
    }

    #[test]
    fn test_destination_containing_source_is_fatal() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("site");
        fs::create_dir_all(&source).unwrap();
        let mut site = StaticSite::new(&config(
            &source,
            OptionsOverride::new().with("destination", dir.path().display().to_string()),
        ));

        assert!(site.process().unwrap_err().is_fatal());
    }
}
