//! Access to locally cached image bytes.
//!
//! The hash-key extractor needs the bytes behind a record's local image
//! path, but this crate performs no filesystem I/O. [`ImageSource`] is the
//! seam: the application supplies a filesystem-backed implementation, and
//! tests use [`memory::InMemoryImages`].
//!
//! A source never fails. A missing or unreadable image is `None`, which the
//! extractor turns into "no hash key" for that record.

pub mod memory;

use sha2::{Digest, Sha256};

/// Read-only access to locally cached images, keyed by the record's
/// `image_url` path.
pub trait ImageSource {
    /// Bytes of the image at `path`, or `None` when it cannot be read.
    fn read(&self, path: &str) -> Option<Vec<u8>>;
}

/// A source with no images. Every hash key comes out empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageSource for NoImages {
    fn read(&self, _path: &str) -> Option<Vec<u8>> {
        None
    }
}

impl<T: ImageSource + ?Sized> ImageSource for &T {
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        (**self).read(path)
    }
}

/// SHA-256 of `bytes`, lower-case hex.
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
