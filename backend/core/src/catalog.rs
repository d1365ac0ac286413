//! Image catalog: the supported image files sitting in one directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::error::{LabelError, LabelResult};
use crate::natural::natural_sort;

/// Extensions the catalog recognises, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff"];

/// Whether `name` carries one of the supported image extensions.
pub fn has_image_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Whether `name` is usable as a catalog identifier.
///
/// Identifiers are bare file names. Hidden files are skipped, and so are names
/// containing whitespace: the ledger separates identifier from text at the
/// first whitespace character, so such a name could never be recorded.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_whitespace)
}

#[derive(Debug, Clone)]
pub struct ImageCatalog {
    dir: PathBuf,
}

impl ImageCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List image identifiers in natural order.
    ///
    /// The scan is non-recursive. A missing directory yields an empty list.
    pub async fn list_images(&self) -> LabelResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "Image directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(LabelError::storage(
                    format!("failed to read image directory {}", self.dir.display()),
                    e,
                ))
            }
        };

        let mut names = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    return Err(LabelError::storage(
                        format!("failed to scan image directory {}", self.dir.display()),
                        e,
                    ))
                }
            };

            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(path = %entry.path().display(), "Skipping image with non UTF-8 name");
                continue;
            };
            if !is_valid_identifier(&name) || !has_image_extension(&name) {
                continue;
            }
            // Follows symlinks, like a glob would.
            match fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => names.push(name),
                Ok(_) => {}
                Err(e) => debug!(name = %name, error = %e, "Skipping unreadable entry"),
            }
        }

        natural_sort(&mut names);
        names.dedup();
        Ok(names)
    }

    /// Resolve an identifier to its path when it names an image currently in
    /// the catalog.
    pub async fn resolve(&self, name: &str) -> Option<PathBuf> {
        if !is_valid_identifier(name) || !has_image_extension(name) {
            return None;
        }
        let path = self.dir.join(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.resolve(name).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    #[tokio::test]
    async fn lists_supported_images_in_natural_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["img10.png", "img2.png", "img1.png", "notes.txt", "scan.JPEG", ".hidden.png"] {
            touch(dir.path(), name);
        }
        std::fs::create_dir(dir.path().join("folder.png")).unwrap();

        let catalog = ImageCatalog::new(dir.path());
        let images = catalog.list_images().await.unwrap();
        assert_eq!(images, vec!["img1.png", "img2.png", "img10.png", "scan.JPEG"]);
    }

    #[tokio::test]
    async fn listing_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.bmp", "a.tiff", "c3.jpg", "c20.jpg"] {
            touch(dir.path(), name);
        }
        let catalog = ImageCatalog::new(dir.path());
        let first = catalog.list_images().await.unwrap();
        let second = catalog.list_images().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec!["a.tiff", "b.bmp", "c3.jpg", "c20.jpg"]);
    }

    #[tokio::test]
    async fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ImageCatalog::new(dir.path().join("nope"));
        assert!(catalog.list_images().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn names_with_whitespace_are_not_catalogued() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "two words.png");
        touch(dir.path(), "one.png");
        let catalog = ImageCatalog::new(dir.path());
        assert_eq!(catalog.list_images().await.unwrap(), vec!["one.png"]);
        assert!(!catalog.contains("two words.png").await);
    }

    #[tokio::test]
    async fn resolve_rejects_traversal_and_unsupported_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");
        touch(dir.path(), "a.txt");
        let catalog = ImageCatalog::new(dir.path());

        assert_eq!(catalog.resolve("a.png").await, Some(dir.path().join("a.png")));
        assert!(catalog.resolve("a.txt").await.is_none());
        assert!(catalog.resolve("../a.png").await.is_none());
        assert!(catalog.resolve("missing.png").await.is_none());
        assert!(catalog.resolve("").await.is_none());
    }

    #[test]
    fn extension_check_ignores_case() {
        assert!(has_image_extension("x.PNG"));
        assert!(has_image_extension("x.Tiff"));
        assert!(!has_image_extension("x.gif"));
        assert!(!has_image_extension("png"));
    }
}
