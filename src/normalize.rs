//! Normalizer - Reduce any image-like value to a path, URL, bytes, or stream
//!
//! Array data never leaves this module: it is scaled to 8-bit and encoded
//! as PNG before being handed back as a stream.

use std::io::Cursor;

use image::ImageFormat;

use crate::array::{min_max_scale, ArrayBackend, ArrayInput, NdArrayBackend};
use crate::codec::{ImageCodec, RasterCodec};
use crate::error::ImageError;
use crate::source::{Capability, ImageSource, NormalizedImage};

const ARRAY_PURPOSE: &str = "to render images from arrays";

/// Optional collaborators. A missing one is reported when it is needed.
pub struct Collaborators {
    pub arrays: Option<Box<dyn ArrayBackend>>,
    pub codec: Option<Box<dyn ImageCodec>>,
}

impl Collaborators {
    pub fn none() -> Self {
        Self { arrays: None, codec: None }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            arrays: Some(Box::new(NdArrayBackend)),
            codec: Some(Box::new(RasterCodec)),
        }
    }
}

pub struct Normalizer {
    collaborators: Collaborators,
}

impl Normalizer {
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    pub fn normalize(&self, src: ImageSource) -> Result<NormalizedImage, ImageError> {
        if let Some(bytes) = self.encode_array(src.capability())? {
            log::debug!("normalized {} into {} PNG bytes", src.type_name(), bytes.len());
            return Ok(NormalizedImage::Stream(Box::new(Cursor::new(bytes))));
        }

        match src {
            ImageSource::Image(image) => match &self.collaborators.codec {
                Some(codec) => {
                    let format = codec.decode_format_of(&image).unwrap_or(ImageFormat::Png);
                    let bytes = codec.encode_image(&image, format)?;
                    log::debug!("re-encoded decoded image as {:?}", format);
                    Ok(NormalizedImage::Stream(Box::new(Cursor::new(bytes))))
                }
                None => Err(ImageError::UnsupportedType("DecodedImage".to_string())),
            },
            ImageSource::Path(path) => Ok(NormalizedImage::Path(path)),
            ImageSource::Url(url) => Ok(NormalizedImage::Url(url)),
            ImageSource::Bytes(bytes) => Ok(NormalizedImage::Bytes(bytes)),
            ImageSource::Stream(stream) => Ok(NormalizedImage::Stream(stream)),
            other => Err(ImageError::UnsupportedType(other.type_name().to_string())),
        }
    }

    /// `Ok(None)` when the source has no array capability.
    fn encode_array(&self, capability: Capability<'_>) -> Result<Option<Vec<u8>>, ImageError> {
        if !capability.is_array_like() {
            return Ok(None);
        }
        let codec = self
            .collaborators
            .codec
            .as_deref()
            .ok_or(ImageError::MissingDependency("an image codec", ARRAY_PURPOSE))?;
        let arrays = self
            .collaborators
            .arrays
            .as_deref()
            .ok_or(ImageError::MissingDependency("a numeric array backend", ARRAY_PURPOSE))?;

        let input = match capability {
            Capability::Sequence(nested) => ArrayInput::Nested(nested),
            Capability::Array(view) => ArrayInput::View(view),
            Capability::Sparse(sparse) => ArrayInput::Dense(sparse.to_dense()),
            Capability::None => return Ok(None),
        };
        let grid = arrays.to_array(input)?;
        let pixels = min_max_scale(&grid);
        codec.encode(pixels.view(), ImageFormat::Png).map(Some)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Collaborators::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Nested;
    use std::io::Read;

    fn read_all(normalized: NormalizedImage) -> Vec<u8> {
        match normalized {
            NormalizedImage::Stream(mut s) => {
                let mut buf = vec![];
                s.read_to_end(&mut buf).unwrap();
                buf
            }
            other => panic!("expected stream, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_becomes_png_stream() {
        let src = ImageSource::from(Nested::from(vec![vec![0.0, 1.0], vec![2.0, 3.0]]));
        let bytes = read_all(Normalizer::default().normalize(src).unwrap());
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn test_missing_codec_reported_first() {
        let normalizer = Normalizer::new(Collaborators::none());
        let src = ImageSource::from(Nested::from(vec![vec![0.0, 1.0]]));
        let err = normalizer.normalize(src).unwrap_err();
        assert_eq!(err.to_string(), "an image codec is required to render images from arrays");
    }

    #[test]
    fn test_missing_array_backend() {
        let normalizer = Normalizer::new(Collaborators {
            arrays: None,
            codec: Some(Box::new(RasterCodec)),
        });
        let src = ImageSource::from(Nested::from(vec![vec![0.0, 1.0]]));
        assert!(matches!(
            normalizer.normalize(src),
            Err(ImageError::MissingDependency("a numeric array backend", _))
        ));
    }

    #[test]
    fn test_pass_through_does_not_need_collaborators() {
        let normalizer = Normalizer::new(Collaborators::none());
        let out = normalizer.normalize(ImageSource::from("https://a/b.png")).unwrap();
        assert!(matches!(out, NormalizedImage::Url(u) if u == "https://a/b.png"));
    }

    #[test]
    fn test_decoded_image_without_codec_is_unsupported() {
        let normalizer = Normalizer::new(Collaborators::none());
        let src = ImageSource::from(image::DynamicImage::new_rgb8(1, 1));
        let err = normalizer.normalize(src).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedType(t) if t == "DecodedImage"));
    }
}
