//! Image Renderer - Single entry point from image-like value to HTML
//!
//! normalize -> resolve to URL -> style -> img (optionally inside a figure)

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Seek, SeekFrom};

use crate::config::RendererConfig;
use crate::error::ImageError;
use crate::html::{self, Html};
use crate::media::{expand_home, extension_of, resolve_media_url, sniff_extension};
use crate::normalize::{Collaborators, Normalizer};
use crate::source::{ImageSource, NormalizedImage};
use crate::store::{ConfiguredStore, DataUrlStore, InMemoryStore, VirtualFileStore};
use crate::style::{normalize_dimension, Dimension, StyleMap};

const FIGURE_STYLE: &str = "display: flex; flex-direction: column;";
const FIGCAPTION_STYLE: &str =
    "color: var(--muted-foreground); text-align: center; margin-top: 0.5rem;";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub width: Option<Dimension>,
    #[serde(default)]
    pub height: Option<Dimension>,
    #[serde(default)]
    pub rounded: bool,
    /// Extra CSS declarations, in order; they win over computed ones.
    #[serde(default)]
    pub style: StyleMap,
    #[serde(default)]
    pub caption: Option<String>,
}

pub struct ImageRenderer<S: VirtualFileStore> {
    normalizer: Normalizer,
    store: S,
    config: RendererConfig,
}

impl ImageRenderer<ConfiguredStore> {
    /// Virtual files or inline data URLs, as `config.virtual_files` says.
    pub fn from_config(config: RendererConfig) -> Self {
        let store = ConfiguredStore::from_config(&config);
        Self::new(store, config)
    }
}

impl ImageRenderer<InMemoryStore> {
    /// Always registers virtual files, whatever `config.virtual_files` says.
    pub fn in_memory(config: RendererConfig) -> Self {
        let store = InMemoryStore::with_config(&config);
        Self::new(store, config)
    }
}

impl ImageRenderer<DataUrlStore> {
    pub fn inline(config: RendererConfig) -> Self {
        let store = DataUrlStore::with_config(&config);
        Self::new(store, config)
    }
}

impl<S: VirtualFileStore> ImageRenderer<S> {
    pub fn new(store: S, config: RendererConfig) -> Self {
        Self::with_collaborators(store, config, Collaborators::default())
    }

    pub fn with_collaborators(store: S, config: RendererConfig, collaborators: Collaborators) -> Self {
        Self {
            normalizer: Normalizer::new(collaborators),
            store,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn render(
        &mut self,
        src: impl Into<ImageSource>,
        options: &RenderOptions,
    ) -> Result<Html, ImageError> {
        let normalized = self.normalizer.normalize(src.into())?;
        let url = self.resolve(normalized)?;
        let style = self.compute_style(options).to_css();

        let img = html::void_element(
            "img",
            &[
                ("src", Some(url.as_str())),
                ("alt", options.alt.as_deref()),
                ("style", style.as_deref()),
            ],
        );

        match &options.caption {
            Some(caption) => {
                let figcaption = html::element(
                    "figcaption",
                    &[("style", Some(FIGCAPTION_STYLE))],
                    &[html::text(caption)],
                );
                Ok(html::element(
                    "figure",
                    &[("style", Some(FIGURE_STYLE))],
                    &[img, figcaption],
                ))
            }
            None => Ok(img),
        }
    }

    /// Turn a normalized image into a displayable URL.
    fn resolve(&mut self, normalized: NormalizedImage) -> Result<String, ImageError> {
        log::debug!("resolving {} source", normalized.kind());
        match normalized {
            NormalizedImage::Stream(mut stream) => {
                stream.seek(SeekFrom::Start(0))?;
                let mut bytes = vec![];
                stream.read_to_end(&mut bytes)?;
                self.store.register(&bytes, sniff_extension(&bytes))
            }
            NormalizedImage::Bytes(bytes) => self.store.register(&bytes, sniff_extension(&bytes)),
            NormalizedImage::Path(path) => {
                let bytes = fs::read(&path)?;
                self.store.register(&bytes, extension_of(&path).as_deref())
            }
            NormalizedImage::Url(src) => {
                let expanded = expand_home(&src);
                if expanded.is_file() {
                    let bytes = fs::read(&expanded)?;
                    self.store.register(&bytes, extension_of(&expanded).as_deref())
                } else {
                    Ok(resolve_media_url(&src, &self.config.fallback_mime_type))
                }
            }
        }
    }

    fn compute_style(&self, options: &RenderOptions) -> StyleMap {
        let mut style = StyleMap::new();
        style.set("width", normalize_dimension(options.width.as_ref()));
        style.set("height", normalize_dimension(options.height.as_ref()));
        style.set(
            "border-radius",
            options.rounded.then(|| self.config.rounded_radius.clone()),
        );
        for (key, value) in options.style.iter() {
            style.set(key, Some(value.to_string()));
        }
        style
    }
}
