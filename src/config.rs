//! Renderer Configuration
//!
//! Every field has a default, so `{}` is a valid config file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ImageError;
use crate::media::DEFAULT_MIME_TYPE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererConfig {
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    #[serde(default = "default_extension")]
    pub default_extension: String,
    #[serde(default = "default_fallback_mime_type")]
    pub fallback_mime_type: String,
    #[serde(default = "default_rounded_radius")]
    pub rounded_radius: String,
    /// When false, registered bytes become inline `data:` URLs.
    #[serde(default = "default_true")]
    pub virtual_files: bool,
}

fn default_url_prefix() -> String { "./@file/".to_string() }
fn default_extension() -> String { "png".to_string() }
fn default_fallback_mime_type() -> String { DEFAULT_MIME_TYPE.to_string() }
fn default_rounded_radius() -> String { "4px".to_string() }
fn default_true() -> bool { true }

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            url_prefix: default_url_prefix(),
            default_extension: default_extension(),
            fallback_mime_type: default_fallback_mime_type(),
            rounded_radius: default_rounded_radius(),
            virtual_files: default_true(),
        }
    }
}

impl RendererConfig {
    pub fn from_json(content: &str) -> Result<Self, ImageError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ImageError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = RendererConfig::from_json("{}").unwrap();
        assert_eq!(config, RendererConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = RendererConfig::from_json(r#"{"urlPrefix": "/files/", "virtualFiles": false}"#).unwrap();
        assert_eq!(config.url_prefix, "/files/");
        assert!(!config.virtual_files);
        assert_eq!(config.rounded_radius, "4px");
    }

    #[test]
    fn test_invalid_json() {
        let err = RendererConfig::from_json("{").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
