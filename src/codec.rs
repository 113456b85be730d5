//! Image Codec - Pixel grids and decoded images to encoded bytes

use std::io::Cursor;

use image::{DynamicImage, GrayAlphaImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use ndarray::ArrayViewD;

use crate::error::ImageError;
use crate::source::DecodedImage;

/// Image-codec collaborator.
pub trait ImageCodec {
    /// Encode an 8-bit grid shaped `(H, W)` or `(H, W, C)`.
    fn encode(&self, pixels: ArrayViewD<'_, u8>, format: ImageFormat) -> Result<Vec<u8>, ImageError>;

    fn encode_image(&self, image: &DecodedImage, format: ImageFormat) -> Result<Vec<u8>, ImageError>;

    fn decode_format_of(&self, image: &DecodedImage) -> Option<ImageFormat>;
}

/// Default codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl ImageCodec for RasterCodec {
    fn encode(&self, pixels: ArrayViewD<'_, u8>, format: ImageFormat) -> Result<Vec<u8>, ImageError> {
        let image = grid_to_image(pixels)?;
        write_image(&image, format)
    }

    fn encode_image(&self, image: &DecodedImage, format: ImageFormat) -> Result<Vec<u8>, ImageError> {
        write_image(image.image(), format)
    }

    fn decode_format_of(&self, image: &DecodedImage) -> Option<ImageFormat> {
        image.format()
    }
}

fn write_image(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ImageError> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, format)?;
    Ok(cursor.into_inner())
}

/// Interpret the trailing axis of a rank-3 grid as channels.
fn grid_to_image(pixels: ArrayViewD<'_, u8>) -> Result<DynamicImage, ImageError> {
    let (height, width, channels) = match *pixels.shape() {
        [h, w] => (h, w, 1),
        [h, w, c] => (h, w, c),
        ref other => {
            return Err(ImageError::InvalidArray(format!(
                "expected a 2-D or 3-D grid, got shape {:?}",
                other
            )))
        }
    };
    if height == 0 || width == 0 {
        return Err(ImageError::InvalidArray("grid has no pixels".to_string()));
    }

    let w = u32::try_from(width)
        .map_err(|_| ImageError::InvalidArray(format!("width {} too large", width)))?;
    let h = u32::try_from(height)
        .map_err(|_| ImageError::InvalidArray(format!("height {} too large", height)))?;
    // Logical (row-major) order regardless of memory layout.
    let raw: Vec<u8> = pixels.iter().copied().collect();

    let image = match channels {
        1 => GrayImage::from_raw(w, h, raw).map(DynamicImage::ImageLuma8),
        2 => GrayAlphaImage::from_raw(w, h, raw).map(DynamicImage::ImageLumaA8),
        3 => RgbImage::from_raw(w, h, raw).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(w, h, raw).map(DynamicImage::ImageRgba8),
        c => {
            return Err(ImageError::InvalidArray(format!(
                "unsupported channel count {}",
                c
            )))
        }
    };

    image.ok_or_else(|| ImageError::InvalidArray("pixel buffer does not match grid shape".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use ndarray::{Array2, Array3, ArrayD, IxDyn};

    #[test]
    fn test_encode_gray_png() {
        let grid = Array2::from_shape_vec((2, 3), vec![0u8, 50, 100, 150, 200, 255]).unwrap();
        let png = RasterCodec.encode(grid.view().into_dyn(), ImageFormat::Png).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.to_luma8().get_pixel(2, 1).0, [255]);
    }

    #[test]
    fn test_encode_rgb_grid() {
        let grid = Array3::<u8>::from_elem((4, 5, 3), 9);
        let png = RasterCodec.encode(grid.view().into_dyn(), ImageFormat::Png).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (5, 4));
        assert_eq!(decoded.to_rgb8().get_pixel(0, 0).0, [9, 9, 9]);
    }

    #[test]
    fn test_rejects_rank_one_and_bad_channels() {
        let flat = ArrayD::<u8>::zeros(IxDyn(&[4]));
        assert!(RasterCodec.encode(flat.view(), ImageFormat::Png).is_err());

        let five = ArrayD::<u8>::zeros(IxDyn(&[2, 2, 5]));
        let err = RasterCodec.encode(five.view(), ImageFormat::Png).unwrap_err();
        assert!(err.to_string().contains("channel count 5"));
    }

    #[test]
    fn test_decode_format_of_reports_origin() {
        let img = DecodedImage::new(DynamicImage::new_rgb8(1, 1)).with_format(ImageFormat::Jpeg);
        assert_eq!(RasterCodec.decode_format_of(&img), Some(ImageFormat::Jpeg));
    }
}
