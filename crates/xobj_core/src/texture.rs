//! Texture file resolution for materials.
//!
//! OBJ files name their texture relative to the model. Exporters often ship
//! the `.dds` version only, so a missing file is retried with the fallback
//! extension before giving up. Resolved textures are cached by name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while locating or probing a texture.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Texture not found: {name} (tried {tried:?})")]
    NotFound { name: String, tried: Vec<PathBuf> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A texture file found on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextureInfo {
    /// Resolved file path
    pub path: PathBuf,

    /// Pixel size read from the image header, if the format could be probed
    pub dimensions: Option<(u32, u32)>,
}

/// Resolves texture names against a base directory.
#[derive(Clone, Debug)]
pub struct TextureResolver {
    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,

    /// Extension tried when the named file is missing
    fallback_extension: Option<String>,

    /// Resolved textures by name as written in the OBJ
    cache: HashMap<String, TextureInfo>,
}

impl TextureResolver {
    pub fn new() -> Self {
        Self {
            base_dir: None,
            fallback_extension: Some("dds".to_string()),
            cache: HashMap::new(),
        }
    }

    /// Create a resolver with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
            ..Self::new()
        }
    }

    pub fn set_base_dir(&mut self, base_dir: impl Into<PathBuf>) {
        self.base_dir = Some(base_dir.into());
        self.cache.clear();
    }

    /// Set or disable the fallback extension (without the leading dot).
    pub fn set_fallback_extension(&mut self, extension: Option<&str>) {
        self.fallback_extension = extension.map(|e| e.trim_start_matches('.').to_string());
        self.cache.clear();
    }

    /// Candidate paths for `name`, in lookup order.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let primary = self.resolve_path(name);
        let mut candidates = vec![primary.clone()];
        if let Some(extension) = &self.fallback_extension {
            let fallback = primary.with_extension(extension);
            if fallback != primary {
                candidates.push(fallback);
            }
        }
        candidates
    }

    /// Find the file for `name`, trying the fallback extension second.
    pub fn resolve(&self, name: &str) -> TextureResult<PathBuf> {
        let tried = self.candidates(name);
        match tried.iter().find(|path| path.is_file()) {
            Some(path) => Ok(path.clone()),
            None => Err(TextureError::NotFound {
                name: name.to_string(),
                tried,
            }),
        }
    }

    /// Resolve `name` and read its image header, using the cache if available.
    pub fn load(&mut self, name: &str) -> TextureResult<TextureInfo> {
        if let Some(info) = self.cache.get(name) {
            return Ok(info.clone());
        }

        let path = self.resolve(name)?;
        let dimensions = match probe_dimensions(&path) {
            Ok(size) => Some(size),
            Err(e) => {
                log::warn!("Could not read image header of {}: {}", path.display(), e);
                None
            }
        };

        let info = TextureInfo { path, dimensions };
        log::debug!("Resolved texture {} -> {}", name, info.path.display());
        self.cache.insert(name.to_string(), info.clone());
        Ok(info)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Resolve a path relative to the base directory.
    fn resolve_path(&self, name: &str) -> PathBuf {
        let path = Path::new(name);

        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for TextureResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Read width and height without decoding the pixels.
pub fn probe_dimensions(path: &Path) -> TextureResult<(u32, u32)> {
    Ok(image::image_dimensions(path)?)
}
