//! Category discovery under a document root.
//!
//! A directory is a category when it directly contains the marker file
//! [`CATEGORY_MARKER`]. Its name is its path relative to the root.

use crate::exemplars::{select_exemplars, ExemplarError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Marker file designating its containing directory as a category
pub const CATEGORY_MARKER: &str = "kategorie";

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Document root not found or not a directory: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error(transparent)]
    Exemplar(#[from] ExemplarError),
}

/// One category with its candidate filenames and selected exemplars
#[derive(Debug, Clone)]
pub struct Category {
    /// Relative path from the document root, `/`-separated
    pub name: String,
    /// Absolute directory path
    pub path: PathBuf,
    /// Number of candidate filenames found
    pub file_count: usize,
    /// Diverse subset shown to the model (sorted)
    pub exemplars: Vec<String>,
}

/// Snapshot of all categories under a document root
#[derive(Debug, Clone)]
pub struct CategoryIndex {
    root: PathBuf,
    categories: BTreeMap<String, Category>,
}

impl CategoryIndex {
    /// Walk `root` and collect every marked directory.
    ///
    /// Unreadable directories are skipped with a warning.
    pub fn build(root: &Path, cap: usize) -> Result<Self, IndexError> {
        if !root.is_dir() {
            return Err(IndexError::RootNotFound(root.to_path_buf()));
        }

        let mut categories = BTreeMap::new();

        for entry in WalkDir::new(root).follow_links(false).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("[Categories] Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let dir = entry.path();
            if !has_marker(dir) {
                continue;
            }

            let Some(name) = category_name(root, dir) else {
                continue;
            };

            let files = list_candidates(dir);
            let file_count = files.len();
            let exemplars = select_exemplars(files, cap)?;

            tracing::debug!(
                "[Categories] {}: {} files -> {} exemplars",
                name,
                file_count,
                exemplars.len()
            );

            categories.insert(
                name.clone(),
                Category {
                    name,
                    path: dir.to_path_buf(),
                    file_count,
                    exemplars,
                },
            );
        }

        tracing::info!(
            "[Categories] Indexed {} categories under {}",
            categories.len(),
            root.display()
        );

        Ok(Self {
            root: root.to_path_buf(),
            categories,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.get(name)
    }

    /// Categories in name order
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    /// Render the prompt listing, one line per category:
    /// `Name: "file1", "file2"`
    pub fn render_listing(&self) -> String {
        let mut listing = String::new();
        for category in self.categories() {
            let quoted: Vec<String> = category
                .exemplars
                .iter()
                .map(|name| format!("\"{}\"", name))
                .collect();
            listing.push_str(&format!("{}: {}\n", category.name, quoted.join(", ")));
        }
        listing
    }
}

/// Relative `/`-joined name of `dir` under `root`; `None` for the root itself
fn category_name(root: &Path, dir: &Path) -> Option<String> {
    let relative = dir.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Whether `dir` holds a marker file. A marker that exists but cannot be
/// inspected is reported and the directory is skipped.
fn has_marker(dir: &Path) -> bool {
    match fs::metadata(dir.join(CATEGORY_MARKER)) {
        Ok(meta) => meta.is_file(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!(
                "[Categories] Cannot check marker in {}: {} - skipping",
                dir.display(),
                e
            );
            false
        }
    }
}

/// Regular, non-hidden files of `dir` except the marker
fn list_candidates(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(
                "[Categories] Cannot read {}: {} - treating as empty",
                dir.display(),
                e
            );
            return Vec::new();
        }
    };

    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name != CATEGORY_MARKER && !name.starts_with('.'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_category(root: &Path, name: &str, files: &[&str]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CATEGORY_MARKER), "").unwrap();
        for file in files {
            fs::write(dir.join(file), b"%PDF-1.4").unwrap();
        }
    }

    #[test]
    fn test_only_marked_directories_are_categories() {
        let temp_dir = TempDir::new().unwrap();
        make_category(temp_dir.path(), "Arbeit", &["Vertrag.pdf"]);
        fs::create_dir_all(temp_dir.path().join("Unsortiert")).unwrap();
        fs::write(temp_dir.path().join("Unsortiert/scan.pdf"), b"").unwrap();

        let index = CategoryIndex::build(temp_dir.path(), 10).unwrap();

        assert_eq!(index.len(), 1);
        assert!(index.get("Arbeit").is_some());
        assert!(index.get("Unsortiert").is_none());
    }

    #[test]
    fn test_marker_never_listed() {
        let temp_dir = TempDir::new().unwrap();
        make_category(temp_dir.path(), "Schule", &["Zeugnis 2022.pdf", "Zeugnis 2023.pdf"]);

        let index = CategoryIndex::build(temp_dir.path(), 10).unwrap();
        let listing = index.render_listing();

        assert!(!listing.contains(CATEGORY_MARKER));
        assert_eq!(index.get("Schule").unwrap().file_count, 2);
    }

    #[test]
    fn test_nested_categories_are_independent() {
        let temp_dir = TempDir::new().unwrap();
        make_category(temp_dir.path(), "Versicherung", &["Haftpflicht.pdf"]);
        make_category(temp_dir.path(), "Versicherung/Kfz", &["Kfz 2024.pdf"]);
        make_category(temp_dir.path(), "Privat/Steuer", &["Bescheid 2023.pdf"]);

        let index = CategoryIndex::build(temp_dir.path(), 10).unwrap();

        assert!(index.get("Versicherung").is_some());
        assert!(index.get("Versicherung/Kfz").is_some());
        assert!(index.get("Privat/Steuer").is_some());
        assert!(index.get("Privat").is_none());
        // Subdirectories are not candidates of the parent
        assert_eq!(index.get("Versicherung").unwrap().exemplars, vec!["Haftpflicht.pdf"]);
    }

    #[test]
    fn test_listing_format() {
        let temp_dir = TempDir::new().unwrap();
        make_category(temp_dir.path(), "Arbeit", &["b.pdf", "a.pdf"]);
        make_category(temp_dir.path(), "Leer", &[]);

        let index = CategoryIndex::build(temp_dir.path(), 10).unwrap();

        assert_eq!(index.render_listing(), "Arbeit: \"a.pdf\", \"b.pdf\"\nLeer: \n");
    }

    #[test]
    fn test_large_category_is_capped() {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<String> = (1..=12).map(|i| format!("Abrechnung {:02}.pdf", i)).collect();
        let refs: Vec<&str> = files.iter().map(|s| s.as_str()).collect();
        make_category(temp_dir.path(), "Arbeit", &refs);

        let index = CategoryIndex::build(temp_dir.path(), 10).unwrap();
        let arbeit = index.get("Arbeit").unwrap();

        assert_eq!(arbeit.file_count, 12);
        assert_eq!(arbeit.exemplars.len(), 10);
    }

    #[test]
    fn test_hidden_files_skipped() {
        let temp_dir = TempDir::new().unwrap();
        make_category(temp_dir.path(), "Arbeit", &[".DS_Store", "Vertrag.pdf"]);

        let index = CategoryIndex::build(temp_dir.path(), 10).unwrap();

        assert_eq!(index.get("Arbeit").unwrap().exemplars, vec!["Vertrag.pdf"]);
    }

    #[test]
    fn test_root_marker_is_not_a_category() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CATEGORY_MARKER), "").unwrap();

        let index = CategoryIndex::build(temp_dir.path(), 10).unwrap();

        assert!(index.is_empty());
        assert_eq!(index.render_listing(), "");
    }

    #[test]
    fn test_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let result = CategoryIndex::build(&missing, 10);

        assert!(matches!(result, Err(IndexError::RootNotFound(_))));
    }

    #[test]
    fn test_zero_cap_propagates() {
        let temp_dir = TempDir::new().unwrap();
        make_category(temp_dir.path(), "Arbeit", &["a.pdf"]);

        let result = CategoryIndex::build(temp_dir.path(), 0);

        assert!(matches!(result, Err(IndexError::Exemplar(ExemplarError::ZeroCap))));
    }

    #[test]
    fn test_unlistable_directory_has_no_candidates() {
        let temp_dir = TempDir::new().unwrap();
        let not_a_dir = temp_dir.path().join("scan.pdf");
        fs::write(&not_a_dir, b"%PDF-1.4").unwrap();

        assert!(list_candidates(&not_a_dir).is_empty());
        assert!(list_candidates(&temp_dir.path().join("missing")).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_category_counts_as_empty() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        make_category(temp_dir.path(), "Gesperrt", &["Geheim.pdf"]);
        let locked = temp_dir.path().join("Gesperrt");
        // Traversable, so the marker is visible, but not listable
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o311)).unwrap();

        if fs::read_dir(&locked).is_ok() {
            // Permissions are not enforced for this user (root)
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let index = CategoryIndex::build(temp_dir.path(), 10);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let index = index.unwrap();
        let category = index.get("Gesperrt").unwrap();
        assert_eq!(category.file_count, 0);
        assert!(index.render_listing().contains("Gesperrt: \n"));
    }
}
