//! Media helpers - MIME types, data URLs, path strings

use std::path::{Path, PathBuf};

use base64::Engine;
use image::ImageFormat;

pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// MIME type for a file extension, with or without the leading dot.
pub fn mime_type_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    if ext == "svg" {
        return Some("image/svg+xml");
    }
    ImageFormat::from_extension(&ext).map(|f| f.to_mime_type())
}

/// Preferred extension for an encoded format.
pub fn format_extension(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("png")
}

/// Extension for bytes whose container format can be recognized.
pub fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(format_extension)
}

/// Suffix of `path` without the dot, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

pub fn to_data_url(bytes: &[u8], mime_type: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime_type, encoded)
}

/// URL scheme of `src`, if it has one. Single letters are drive names.
pub fn url_scheme(src: &str) -> Option<&str> {
    let (scheme, _) = src.split_once(':')?;
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let valid = starts_alpha
        && scheme.len() > 1
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Best-effort resolution of a string that is not a local file.
///
/// Remote and relative URLs pass through untouched. A data URL that omits
/// its media type gets `fallback_mime_type`.
pub fn resolve_media_url(src: &str, fallback_mime_type: &str) -> String {
    match url_scheme(src) {
        Some(scheme) if scheme.eq_ignore_ascii_case("data") => {
            let rest = &src[scheme.len() + 1..];
            if rest.starts_with(';') || rest.starts_with(',') {
                format!("data:{}{}", fallback_mime_type, rest)
            } else {
                src.to_string()
            }
        }
        _ => src.to_string(),
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(src: &str) -> PathBuf {
    let rest = match src.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return PathBuf::from(src),
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
        None => PathBuf::from(src),
    }
}
