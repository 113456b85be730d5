//! Virtual Files - Bytes in, addressable URL out
//!
//! Stores never deduplicate: every registration allocates a new entry.

use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::RendererConfig;
use crate::error::ImageError;
use crate::media::{mime_type_for_extension, to_data_url};

/// Virtual-file collaborator.
pub trait VirtualFileStore {
    /// Register `bytes` and return the URL that serves them. `ext` is a
    /// suffix hint such as `"png"` or `".jpg"`.
    fn register(&mut self, bytes: &[u8], ext: Option<&str>) -> Result<String, ImageError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct VirtualFile {
    pub filename: String,
    pub url: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl VirtualFile {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// In-process store. URLs look like `./@file/<len>-<uuid>.<ext>`.
pub struct InMemoryStore {
    files: HashMap<String, VirtualFile>,
    url_prefix: String,
    default_extension: String,
    fallback_mime_type: String,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_config(&RendererConfig::default())
    }

    pub fn with_config(config: &RendererConfig) -> Self {
        Self {
            files: HashMap::new(),
            url_prefix: config.url_prefix.clone(),
            default_extension: config.default_extension.clone(),
            fallback_mime_type: config.fallback_mime_type.clone(),
        }
    }

    pub fn get(&self, url: &str) -> Option<&VirtualFile> {
        self.files.get(url)
    }

    pub fn list(&self) -> Vec<&VirtualFile> {
        self.files.values().collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl VirtualFileStore for InMemoryStore {
    fn register(&mut self, bytes: &[u8], ext: Option<&str>) -> Result<String, ImageError> {
        let ext = clean_extension(ext, &self.default_extension);
        let filename = format!("{}-{}.{}", bytes.len(), Uuid::new_v4().simple(), ext);
        let url = format!("{}{}", self.url_prefix, filename);
        let mime_type = mime_type_for_extension(&ext)
            .unwrap_or(self.fallback_mime_type.as_str())
            .to_string();

        log::debug!("registered virtual file {} ({} bytes)", url, bytes.len());
        self.files.insert(
            url.clone(),
            VirtualFile {
                filename,
                url: url.clone(),
                mime_type,
                bytes: bytes.to_vec(),
            },
        );
        Ok(url)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Stateless store that inlines the bytes as a base64 `data:` URL.
#[derive(Debug, Clone)]
pub struct DataUrlStore {
    fallback_mime_type: String,
}

impl DataUrlStore {
    pub fn new() -> Self {
        Self::with_config(&RendererConfig::default())
    }

    pub fn with_config(config: &RendererConfig) -> Self {
        Self { fallback_mime_type: config.fallback_mime_type.clone() }
    }
}

impl VirtualFileStore for DataUrlStore {
    fn register(&mut self, bytes: &[u8], ext: Option<&str>) -> Result<String, ImageError> {
        let mime_type = ext
            .and_then(mime_type_for_extension)
            .unwrap_or(self.fallback_mime_type.as_str());
        Ok(to_data_url(bytes, mime_type))
    }
}

impl Default for DataUrlStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Store picked by `RendererConfig::virtual_files`.
pub enum ConfiguredStore {
    Virtual(InMemoryStore),
    Inline(DataUrlStore),
}

impl ConfiguredStore {
    pub fn from_config(config: &RendererConfig) -> Self {
        if config.virtual_files {
            ConfiguredStore::Virtual(InMemoryStore::with_config(config))
        } else {
            ConfiguredStore::Inline(DataUrlStore::with_config(config))
        }
    }

    /// Registered virtual files; always empty when inlining.
    pub fn files(&self) -> Vec<&VirtualFile> {
        match self {
            ConfiguredStore::Virtual(store) => store.list(),
            ConfiguredStore::Inline(_) => vec![],
        }
    }
}

impl VirtualFileStore for ConfiguredStore {
    fn register(&mut self, bytes: &[u8], ext: Option<&str>) -> Result<String, ImageError> {
        match self {
            ConfiguredStore::Virtual(store) => store.register(bytes, ext),
            ConfiguredStore::Inline(store) => store.register(bytes, ext),
        }
    }
}

fn clean_extension(ext: Option<&str>, default: &str) -> String {
    match ext.map(|e| e.trim_start_matches('.')) {
        Some(e) if !e.is_empty() => e.to_ascii_lowercase(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_register_and_get() {
        let mut store = InMemoryStore::new();
        let url = store.register(b"abc", Some(".JPG")).unwrap();
        assert!(url.starts_with("./@file/3-"));
        assert!(url.ends_with(".jpg"));

        let file = store.get(&url).unwrap();
        assert_eq!(file.bytes, b"abc");
        assert_eq!(file.mime_type, "image/jpeg");
    }

    #[test]
    fn test_in_memory_default_extension() {
        let mut store = InMemoryStore::new();
        let url = store.register(b"x", None).unwrap();
        assert!(url.ends_with(".png"));
    }

    #[test]
    fn test_no_deduplication() {
        let mut store = InMemoryStore::new();
        let a = store.register(b"same", None).unwrap();
        let b = store.register(b"same", None).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_configured_store_follows_virtual_files() {
        let mut store = ConfiguredStore::from_config(&RendererConfig::default());
        assert!(store.register(b"hi", None).unwrap().starts_with("./@file/2-"));
        assert_eq!(store.files().len(), 1);

        let config = RendererConfig { virtual_files: false, ..Default::default() };
        let mut store = ConfiguredStore::from_config(&config);
        assert_eq!(store.register(b"hi", None).unwrap(), "data:image/png;base64,aGk=");
        assert!(store.files().is_empty());
    }

    #[test]
    fn test_data_url_store() {
        let mut store = DataUrlStore::new();
        assert_eq!(store.register(b"hi", None).unwrap(), "data:image/png;base64,aGk=");
        assert_eq!(store.register(b"hi", Some(".gif")).unwrap(), "data:image/gif;base64,aGk=");
    }
}
