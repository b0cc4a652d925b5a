//! Filesystem-backed [`ImageSource`] over the local image cache.
//!
//! Relative `image_url` paths (e.g. `images/sg003.jpg`) resolve against the
//! configured image root. Anything that cannot be read is logged at debug
//! level and reported as "no image", which leaves the record without a hash
//! key but still eligible for grouping through its other keys.

use std::path::{Path, PathBuf};

use tracing::debug;
use zine_curator_core::image::ImageSource;

#[derive(Debug, Clone)]
pub struct FsImages {
    root: PathBuf,
}

impl FsImages {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }
}

impl ImageSource for FsImages {
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        let full = self.resolve(path);
        if !full.is_file() {
            debug!(path = %full.display(), "image not found; no hash key");
            return None;
        }
        match std::fs::read(&full) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(path = %full.display(), error = %e, "image unreadable; no hash key");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_relative_to_root() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/a.jpg"), b"jpeg").unwrap();

        let images = FsImages::new(dir.path());
        assert_eq!(images.read("images/a.jpg"), Some(b"jpeg".to_vec()));
        assert_eq!(images.read("images/missing.jpg"), None);
    }

    #[test]
    fn test_directory_is_not_an_image() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        assert_eq!(FsImages::new(dir.path()).read("images"), None);
    }

    #[test]
    fn test_absolute_path_ignores_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cover.jpg");
        std::fs::write(&file, b"x").unwrap();
        let images = FsImages::new("/does/not/matter");
        assert_eq!(images.read(file.to_str().unwrap()), Some(b"x".to_vec()));
    }
}
