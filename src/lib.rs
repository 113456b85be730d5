//! Notebook Image - Render image-like values as HTML for notebook cells
//!
//! # Pipeline
//! 1. Normalize: arrays become PNG streams, everything else passes through
//! 2. Resolve: streams, bytes and local files become virtual-file URLs
//! 3. Render: an `<img>`, wrapped in a `<figure>` when captioned

pub mod array;
pub mod codec;
pub mod config;
pub mod error;
pub mod html;
pub mod media;
pub mod normalize;
pub mod render;
pub mod source;
pub mod store;
pub mod style;

pub use array::{ArrayBackend, NdArrayBackend, SparseMatrix};
pub use codec::{ImageCodec, RasterCodec};
pub use config::RendererConfig;
pub use error::ImageError;
pub use html::Html;
pub use normalize::{Collaborators, Normalizer};
pub use render::{ImageRenderer, RenderOptions};
pub use source::{ArrayLike, DecodedImage, ImageSource, Nested, NormalizedImage, SparseLike};
pub use store::{ConfiguredStore, DataUrlStore, InMemoryStore, VirtualFile, VirtualFileStore};
pub use style::{Dimension, StyleMap};

pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render `src` with the default collaborators, inlining any bytes as a
/// `data:` URL.
pub fn image(src: impl Into<ImageSource>, options: &RenderOptions) -> Result<Html, ImageError> {
    ImageRenderer::inline(RendererConfig::default()).render(src, options)
}
