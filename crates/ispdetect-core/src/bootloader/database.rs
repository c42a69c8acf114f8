//! Bootloader database for runtime loading and lookup
//!
//! This module provides the `BootloaderDatabase` type, which extends the
//! compiled-in catalog with image fingerprints loaded from RON files.

use alloc::{format, string::String, vec::Vec};
use std::fs;
use std::io;
use std::path::Path;

use super::fingerprint::Fingerprint;
use super::identify::ImageCatalog;
use super::known::KNOWN_IMAGES;

/// Error type for bootloader database operations
#[derive(Debug)]
pub enum BootloaderDbError {
    /// I/O error reading files
    Io(io::Error),
    /// RON parsing error
    Parse(ron::error::SpannedError),
    /// Validation error
    Validation(String),
}

impl From<io::Error> for BootloaderDbError {
    fn from(e: io::Error) -> Self {
        BootloaderDbError::Io(e)
    }
}

impl From<ron::error::SpannedError> for BootloaderDbError {
    fn from(e: ron::error::SpannedError) -> Self {
        BootloaderDbError::Parse(e)
    }
}

impl std::fmt::Display for BootloaderDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootloaderDbError::Io(e) => write!(f, "I/O error: {}", e),
            BootloaderDbError::Parse(e) => write!(f, "Parse error: {}", e),
            BootloaderDbError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for BootloaderDbError {}

/// Image entry in RON format
#[derive(Debug, Clone, serde::Deserialize)]
struct ImageDef {
    name: String,
    md5: String,
}

/// Top-level RON file
#[derive(Debug, Clone, serde::Deserialize)]
struct DatabaseDef {
    images: Vec<ImageDef>,
}

/// A bootloader image entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootloaderImage {
    /// Image name
    pub name: String,
    /// Digest of the full boot block contents
    pub fingerprint: Fingerprint,
}

/// Runtime bootloader database
///
/// Lookups scan entries in insertion order, so builtin images take
/// precedence over loaded ones with the same digest.
#[derive(Debug, Clone, Default)]
pub struct BootloaderDatabase {
    images: Vec<BootloaderImage>,
}

impl BootloaderDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self { images: Vec::new() }
    }

    /// Create a database holding the compiled-in images
    pub fn with_builtin() -> Self {
        let images = KNOWN_IMAGES
            .iter()
            .map(|img| BootloaderImage {
                name: img.name.into(),
                fingerprint: img.fingerprint,
            })
            .collect();
        Self { images }
    }

    /// Load image definitions from a single RON file
    pub fn load_file(&mut self, path: &Path) -> Result<usize, BootloaderDbError> {
        let content = fs::read_to_string(path)?;
        self.load_ron(&content)
    }

    /// Load image definitions from a RON string
    pub fn load_ron(&mut self, content: &str) -> Result<usize, BootloaderDbError> {
        let def: DatabaseDef = ron::from_str(content)?;

        // Validate everything before touching the database
        let mut parsed = Vec::with_capacity(def.images.len());
        for image in def.images {
            let fingerprint: Fingerprint = image.md5.parse().map_err(|_| {
                BootloaderDbError::Validation(format!(
                    "image '{}': bad md5 '{}', expected 32 hex digits",
                    image.name, image.md5
                ))
            })?;
            if image.name.is_empty() {
                return Err(BootloaderDbError::Validation(format!(
                    "image with md5 {} has no name",
                    fingerprint
                )));
            }
            parsed.push(BootloaderImage {
                name: image.name,
                fingerprint,
            });
        }

        let count = parsed.len();
        self.images.extend(parsed);
        Ok(count)
    }

    /// Load all RON files from a directory, in file name order
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, BootloaderDbError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut total = 0;
        for path in paths {
            total += self.load_file(&path)?;
        }
        Ok(total)
    }

    /// Load a file or every RON file in a directory
    pub fn load_path(&mut self, path: &Path) -> Result<usize, BootloaderDbError> {
        if path.is_dir() {
            self.load_dir(path)
        } else {
            self.load_file(path)
        }
    }

    /// Get all images in the database
    pub fn images(&self) -> &[BootloaderImage] {
        &self.images
    }

    /// Get the number of images in the database
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Check if the database is empty
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Iterate over all images
    pub fn iter(&self) -> impl Iterator<Item = &BootloaderImage> {
        self.images.iter()
    }
}

impl ImageCatalog for BootloaderDatabase {
    fn find(&self, fingerprint: &Fingerprint) -> Option<&str> {
        self.images
            .iter()
            .find(|img| img.fingerprint == *fingerprint)
            .map(|img| img.name.as_str())
    }
}
