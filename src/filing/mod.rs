//! Safe filing of a classified document.
//!
//! The model's proposal is checked against the live category index before
//! anything touches the disk. Existing files are never overwritten.

use crate::ai::ClassificationResult;
use crate::categories::CategoryIndex;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Extension every filed document carries
pub const PDF_EXTENSION: &str = ".pdf";

#[derive(Error, Debug)]
pub enum FilingError {
    #[error("Category \"{category}\" not found: {} is not a category folder", .path.display())]
    CategoryNotFound { category: String, path: PathBuf },

    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("Source does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A validated, not yet executed move of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMoveIntent {
    pub source: PathBuf,
    pub destination_folder: PathBuf,
    pub destination_filename: String,
}

impl FileMoveIntent {
    pub fn destination(&self) -> PathBuf {
        self.destination_folder.join(&self.destination_filename)
    }

    /// Perform the move. Consumes the intent so it runs at most once.
    ///
    /// Preconditions are re-checked right before moving.
    pub fn execute(self) -> Result<PathBuf, FilingError> {
        let destination = self.destination();

        if !self.source.is_file() {
            return Err(FilingError::SourceNotFound(self.source));
        }

        if is_occupied(&destination) {
            return Err(FilingError::DestinationExists(destination));
        }

        move_file(&self.source, &destination)?;

        tracing::info!(
            "[Filer] Moved {} -> {}",
            self.source.display(),
            destination.display()
        );

        Ok(destination)
    }
}

/// Validates classification results and moves documents into place
#[derive(Debug, Default, Clone, Copy)]
pub struct Filer;

impl Filer {
    pub fn new() -> Self {
        Self
    }

    /// Check a result against the index and build the move intent
    pub fn plan(
        &self,
        index: &CategoryIndex,
        result: &ClassificationResult,
        source: &Path,
    ) -> Result<FileMoveIntent, FilingError> {
        let live_category = is_plain_relative(&result.category)
            .then(|| index.get(&normalize_category(&result.category)))
            .flatten()
            .filter(|category| category.path.is_dir());

        let Some(category) = live_category else {
            return Err(FilingError::CategoryNotFound {
                category: result.category.clone(),
                path: index.root().join(&result.category),
            });
        };
        let destination_folder = category.path.clone();

        if !source.is_file() {
            return Err(FilingError::SourceNotFound(source.to_path_buf()));
        }

        let destination_filename = ensure_pdf_extension(&sanitize_title(&result.title));
        let intent = FileMoveIntent {
            source: source.to_path_buf(),
            destination_folder,
            destination_filename,
        };

        let destination = intent.destination();
        if is_occupied(&destination) {
            return Err(FilingError::DestinationExists(destination));
        }

        Ok(intent)
    }

    /// Plan and execute in one step
    pub fn commit(
        &self,
        index: &CategoryIndex,
        result: &ClassificationResult,
        source: &Path,
    ) -> Result<PathBuf, FilingError> {
        self.plan(index, result, source)?.execute()
    }
}

/// Replace path separators and control characters so the title stays one
/// path component
pub fn sanitize_title(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Append `.pdf` unless the name already ends with it (any case)
pub fn ensure_pdf_extension(name: &str) -> String {
    if name.to_lowercase().ends_with(PDF_EXTENSION) {
        name.to_string()
    } else {
        format!("{}{}", name, PDF_EXTENSION)
    }
}

/// Anything at `path`, including a dangling symlink
fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Only normal components: no `..`, no root, no prefix
fn is_plain_relative(category: &str) -> bool {
    let path = Path::new(category);
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Category name in index form (`/`-joined normal components)
fn normalize_category(category: &str) -> String {
    Path::new(category)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Rename, falling back to copy + delete across filesystems
fn move_file(src: &Path, dst: &Path) -> Result<(), FilingError> {
    let io_err = |source| FilingError::Io {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    };

    if let Err(e) = fs::rename(src, dst) {
        tracing::debug!("[Filer] Rename failed ({}), falling back to copy", e);
        fs::copy(src, dst).map_err(io_err)?;
        if let Err(e) = fs::remove_file(src) {
            // Keep exactly one copy of the document
            let _ = fs::remove_file(dst);
            return Err(io_err(e));
        }
    }

    Ok(())
}
