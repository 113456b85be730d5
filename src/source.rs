//! Image Sources - Every shape of input the renderer accepts
//!
//! Array-like values are detected by capability, not by type: a value is
//! treated as an array if it is a nested sequence, exposes an array view, or
//! can densify itself (sparse matrices). Detection runs in that order.

use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, ImageReader};
use ndarray::{Array, ArrayD, ArrayViewD, Dimension};
use serde::{Deserialize, Serialize};

use crate::error::ImageError;

/// A readable binary input that can be rewound to its start.
pub trait ImageStream: Read + Seek {}

impl<T: Read + Seek> ImageStream for T {}

/// Nested numeric sequence, e.g. `[[0, 128], [255, 64]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nested {
    Scalar(f64),
    List(Vec<Nested>),
}

macro_rules! nested_from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for Nested {
            fn from(v: $t) -> Self {
                Nested::Scalar(v as f64)
            }
        })*
    };
}

nested_from_number!(u8, u16, u32, i32, i64, f32, f64);

impl<T: Into<Nested>> From<Vec<T>> for Nested {
    fn from(items: Vec<T>) -> Self {
        Nested::List(items.into_iter().map(Into::into).collect())
    }
}

/// Densification capability of sparse matrix types.
pub trait SparseLike {
    fn to_dense(&self) -> ArrayD<f64>;
}

/// Capability check for values that may hold array data.
///
/// Every accessor defaults to `None`; a value with no capability at all is
/// rejected by the normalizer as an unsupported type.
pub trait ArrayLike {
    /// Runtime type name reported in errors.
    fn type_name(&self) -> &str;

    fn as_nested(&self) -> Option<&Nested> {
        None
    }

    /// Array-protocol capability: a dense view of the data.
    fn as_array(&self) -> Option<ArrayViewD<'_, f64>> {
        None
    }

    fn as_sparse(&self) -> Option<&dyn SparseLike> {
        None
    }
}

impl ArrayLike for Nested {
    fn type_name(&self) -> &str {
        "list"
    }

    fn as_nested(&self) -> Option<&Nested> {
        Some(self)
    }
}

impl<D: Dimension> ArrayLike for Array<f64, D> {
    fn type_name(&self) -> &str {
        "ndarray"
    }

    fn as_array(&self) -> Option<ArrayViewD<'_, f64>> {
        Some(self.view().into_dyn())
    }
}

macro_rules! opaque_scalar {
    ($($t:ty),*) => {
        $(impl ArrayLike for $t {
            fn type_name(&self) -> &str {
                stringify!($t)
            }
        })*
    };
}

opaque_scalar!(bool, i8, i16, i32, i64, u16, u32, u64, usize, f32, f64);

/// Result of capability detection.
pub enum Capability<'a> {
    Sequence(&'a Nested),
    Array(ArrayViewD<'a, f64>),
    Sparse(&'a dyn SparseLike),
    None,
}

impl Capability<'_> {
    pub fn is_array_like(&self) -> bool {
        !matches!(self, Capability::None)
    }
}

/// Inspect `value` in priority order: sequence, array view, sparse.
pub fn detect_capability(value: &dyn ArrayLike) -> Capability<'_> {
    if let Some(nested) = value.as_nested() {
        return Capability::Sequence(nested);
    }
    if let Some(view) = value.as_array() {
        return Capability::Array(view);
    }
    if let Some(sparse) = value.as_sparse() {
        return Capability::Sparse(sparse);
    }
    Capability::None
}

/// A decoded image together with the container format it came from.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    image: DynamicImage,
    format: Option<ImageFormat>,
}

impl DecodedImage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image, format: None }
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader.format();
        let image = reader.decode()?;
        Ok(Self { image, format })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let format = reader.format();
        let image = reader.decode()?;
        Ok(Self { image, format })
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }
}

/// Input to the normalizer.
pub enum ImageSource {
    Path(PathBuf),
    /// A URL, or a string naming a local file.
    Url(String),
    Bytes(Vec<u8>),
    Stream(Box<dyn ImageStream>),
    Image(DecodedImage),
    Nested(Nested),
    Object(Box<dyn ArrayLike>),
}

impl ImageSource {
    pub fn stream(reader: impl Read + Seek + 'static) -> Self {
        ImageSource::Stream(Box::new(reader))
    }

    pub fn object(value: impl ArrayLike + 'static) -> Self {
        ImageSource::Object(Box::new(value))
    }

    pub fn capability(&self) -> Capability<'_> {
        match self {
            ImageSource::Nested(nested) => Capability::Sequence(nested),
            ImageSource::Object(value) => detect_capability(value.as_ref()),
            _ => Capability::None,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            ImageSource::Path(_) => "Path",
            ImageSource::Url(_) => "str",
            ImageSource::Bytes(_) => "bytes",
            ImageSource::Stream(_) => "stream",
            ImageSource::Image(_) => "DecodedImage",
            ImageSource::Nested(_) => "list",
            ImageSource::Object(value) => value.type_name(),
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(p) => f.debug_tuple("Path").field(p).finish(),
            ImageSource::Url(u) => f.debug_tuple("Url").field(u).finish(),
            ImageSource::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            ImageSource::Stream(_) => f.write_str("Stream(..)"),
            ImageSource::Image(img) => f.debug_tuple("Image").field(&img.format()).finish(),
            ImageSource::Nested(n) => f.debug_tuple("Nested").field(n).finish(),
            ImageSource::Object(v) => write!(f, "Object({})", v.type_name()),
        }
    }
}

impl From<&str> for ImageSource {
    fn from(s: &str) -> Self {
        ImageSource::Url(s.to_string())
    }
}

impl From<String> for ImageSource {
    fn from(s: String) -> Self {
        ImageSource::Url(s)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(p: PathBuf) -> Self {
        ImageSource::Path(p)
    }
}

impl From<&Path> for ImageSource {
    fn from(p: &Path) -> Self {
        ImageSource::Path(p.to_path_buf())
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(b: Vec<u8>) -> Self {
        ImageSource::Bytes(b)
    }
}

impl From<&[u8]> for ImageSource {
    fn from(b: &[u8]) -> Self {
        ImageSource::Bytes(b.to_vec())
    }
}

impl From<File> for ImageSource {
    fn from(file: File) -> Self {
        ImageSource::stream(file)
    }
}

impl From<Cursor<Vec<u8>>> for ImageSource {
    fn from(cursor: Cursor<Vec<u8>>) -> Self {
        ImageSource::stream(cursor)
    }
}

impl From<Nested> for ImageSource {
    fn from(n: Nested) -> Self {
        ImageSource::Nested(n)
    }
}

impl From<DecodedImage> for ImageSource {
    fn from(img: DecodedImage) -> Self {
        ImageSource::Image(img)
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(img: DynamicImage) -> Self {
        ImageSource::Image(DecodedImage::new(img))
    }
}

/// Output of the normalizer. Never holds array data.
pub enum NormalizedImage {
    Path(PathBuf),
    Url(String),
    Bytes(Vec<u8>),
    Stream(Box<dyn ImageStream>),
}

impl NormalizedImage {
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizedImage::Path(_) => "path",
            NormalizedImage::Url(_) => "url",
            NormalizedImage::Bytes(_) => "bytes",
            NormalizedImage::Stream(_) => "stream",
        }
    }
}

impl fmt::Debug for NormalizedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedImage::Path(p) => f.debug_tuple("Path").field(p).finish(),
            NormalizedImage::Url(u) => f.debug_tuple("Url").field(u).finish(),
            NormalizedImage::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            NormalizedImage::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}
