//! Image handling for PDF generation.
//!
//! Logos and chart rasters are embedded as image XObjects (PDF spec
//! Section 8.9).
//!
//! # Supported Formats
//!
//! - **JPEG**: Pass-through embedding using DCTDecode filter
//! - **PNG**: Decoded to raw samples, then Flate-compressed; an alpha
//!   channel becomes a separate `/SMask` image

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::object::Object;

/// Image format for PDF embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image (DCTDecode filter)
    Jpeg,
    /// PNG image (FlateDecode filter)
    Png,
    /// Raw uncompressed image data
    Raw,
}

/// Color space for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Grayscale (1 component per pixel)
    DeviceGray,
    /// RGB color (3 components per pixel)
    DeviceRGB,
    /// CMYK color (4 components per pixel)
    DeviceCMYK,
}

impl ColorSpace {
    /// Get the number of color components.
    pub fn components(&self) -> u8 {
        match self {
            ColorSpace::DeviceGray => 1,
            ColorSpace::DeviceRGB => 3,
            ColorSpace::DeviceCMYK => 4,
        }
    }

    /// Get the PDF name for this color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }
}

/// Image data for PDF embedding.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Bits per component (usually 8)
    pub bits_per_component: u8,
    /// Color space
    pub color_space: ColorSpace,
    /// Image format
    pub format: ImageFormat,
    /// Raw or encoded image data
    pub data: Vec<u8>,
    /// Optional soft mask (alpha channel) data, Flate-compressed
    pub soft_mask: Option<Vec<u8>>,
}

impl ImageData {
    /// Create new image data from raw samples.
    pub fn new(width: u32, height: u32, color_space: ColorSpace, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            bits_per_component: 8,
            color_space,
            format: ImageFormat::Raw,
            data,
            soft_mask: None,
        }
    }

    /// Load a JPEG image from raw JPEG data.
    ///
    /// JPEG images are embedded directly without transcoding.
    pub fn from_jpeg(data: Vec<u8>) -> Result<Self, ImageError> {
        let (width, height, color_space) = parse_jpeg_header(&data)?;
        check_dimensions(width, height)?;

        Ok(Self {
            width,
            height,
            bits_per_component: 8,
            color_space,
            format: ImageFormat::Jpeg,
            data,
            soft_mask: None,
        })
    }

    /// Load a PNG image from raw PNG data.
    pub fn from_png(data: &[u8]) -> Result<Self, ImageError> {
        use image::GenericImageView;

        let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)
            .map_err(|e| ImageError::DecodeError(e.to_string()))?;

        let (width, height) = img.dimensions();
        check_dimensions(width, height)?;

        let (color_space, pixels, alpha) = if img.color().has_alpha() {
            if img.color().has_color() {
                let rgba = img.to_rgba8();
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                let mut alpha_channel = Vec::with_capacity((width * height) as usize);
                for pixel in rgba.pixels() {
                    rgb.extend_from_slice(&pixel.0[..3]);
                    alpha_channel.push(pixel.0[3]);
                }
                (ColorSpace::DeviceRGB, rgb, Some(alpha_channel))
            } else {
                let la = img.to_luma_alpha8();
                let mut gray = Vec::with_capacity((width * height) as usize);
                let mut alpha_channel = Vec::with_capacity((width * height) as usize);
                for pixel in la.pixels() {
                    gray.push(pixel.0[0]);
                    alpha_channel.push(pixel.0[1]);
                }
                (ColorSpace::DeviceGray, gray, Some(alpha_channel))
            }
        } else if img.color().has_color() {
            (ColorSpace::DeviceRGB, img.to_rgb8().into_raw(), None)
        } else {
            (ColorSpace::DeviceGray, img.to_luma8().into_raw(), None)
        };

        // Fully opaque alpha adds nothing but file size
        let alpha = alpha.filter(|a| a.iter().any(|&v| v != u8::MAX));

        Ok(Self {
            width,
            height,
            bits_per_component: 8,
            color_space,
            format: ImageFormat::Png,
            data: compress_image_data(&pixels)?,
            soft_mask: alpha.map(|a| compress_image_data(&a)).transpose()?,
        })
    }

    /// Load an image from raw bytes, auto-detecting format.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ImageError> {
        if data.starts_with(&[0xFF, 0xD8]) {
            return Self::from_jpeg(data.to_vec());
        }

        if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Self::from_png(data);
        }

        Err(ImageError::UnsupportedFormat)
    }

    /// Load an image from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| ImageError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(&data)
    }

    /// Build the PDF Image XObject dictionary.
    pub fn build_xobject_dict(&self) -> HashMap<String, Object> {
        let mut dict = HashMap::new();

        dict.insert("Type".to_string(), Object::Name("XObject".to_string()));
        dict.insert("Subtype".to_string(), Object::Name("Image".to_string()));
        dict.insert("Width".to_string(), Object::Integer(self.width as i64));
        dict.insert("Height".to_string(), Object::Integer(self.height as i64));
        dict.insert(
            "ColorSpace".to_string(),
            Object::Name(self.color_space.pdf_name().to_string()),
        );
        dict.insert(
            "BitsPerComponent".to_string(),
            Object::Integer(self.bits_per_component as i64),
        );

        match self.format {
            ImageFormat::Jpeg => {
                dict.insert("Filter".to_string(), Object::Name("DCTDecode".to_string()));
            },
            ImageFormat::Png => {
                dict.insert("Filter".to_string(), Object::Name("FlateDecode".to_string()));
            },
            ImageFormat::Raw => {},
        }

        dict
    }

    /// Build a soft mask (alpha channel) XObject dictionary.
    pub fn build_soft_mask_dict(&self) -> Option<HashMap<String, Object>> {
        self.soft_mask.as_ref().map(|_| {
            let mut dict = HashMap::new();
            dict.insert("Type".to_string(), Object::Name("XObject".to_string()));
            dict.insert("Subtype".to_string(), Object::Name("Image".to_string()));
            dict.insert("Width".to_string(), Object::Integer(self.width as i64));
            dict.insert("Height".to_string(), Object::Integer(self.height as i64));
            dict.insert("ColorSpace".to_string(), Object::Name("DeviceGray".to_string()));
            dict.insert("BitsPerComponent".to_string(), Object::Integer(8));
            dict.insert("Filter".to_string(), Object::Name("FlateDecode".to_string()));
            dict
        })
    }

    /// Get the aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Calculate dimensions to fit within a bounding box while maintaining aspect ratio.
    ///
    /// The result never exceeds either bound.
    pub fn fit_to_box(&self, max_width: f32, max_height: f32) -> (f32, f32) {
        let aspect = self.aspect_ratio();
        let box_aspect = max_width / max_height;

        if aspect > box_aspect {
            // Wider than the box: width is the binding constraint
            (max_width, max_width / aspect)
        } else {
            (max_height * aspect, max_height)
        }
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidData(format!(
            "image has zero extent ({}x{})",
            width, height
        )));
    }
    Ok(())
}

/// Image embedding error.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Unsupported image format
    #[error("Unsupported image format")]
    UnsupportedFormat,

    /// Failed to decode image
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    /// Failed to compress image data
    #[error("Compression error: {0}")]
    CompressionError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),
}

/// Parse JPEG header to extract dimensions and color space.
fn parse_jpeg_header(data: &[u8]) -> Result<(u32, u32, ColorSpace), ImageError> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(ImageError::InvalidData("Not a valid JPEG".to_string()));
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }

        let marker = data[pos + 1];
        pos += 2;

        if marker == 0xFF || marker == 0x00 {
            continue;
        }

        // SOFn markers, excluding DHT (C4), JPG (C8) and DAC (CC)
        if matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            if pos + 7 >= data.len() {
                return Err(ImageError::InvalidData("Truncated JPEG header".to_string()));
            }

            let height = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as u32;
            let width = u16::from_be_bytes([data[pos + 5], data[pos + 6]]) as u32;
            let color_space = match data[pos + 7] {
                1 => ColorSpace::DeviceGray,
                4 => ColorSpace::DeviceCMYK,
                _ => ColorSpace::DeviceRGB,
            };

            return Ok((width, height, color_space));
        }

        if pos + 2 > data.len() {
            break;
        }
        let length = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        pos += length;
    }

    Err(ImageError::InvalidData("Could not find JPEG dimensions".to_string()))
}

/// Compress raw samples with Flate (no predictor).
fn compress_image_data(data: &[u8]) -> Result<Vec<u8>, ImageError> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ImageError::CompressionError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| ImageError::CompressionError(e.to_string()))
}

/// Image placement on a PDF page.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge in PDF space, top edge in layout space)
    pub y: f32,
    /// Display width
    pub width: f32,
    /// Display height
    pub height: f32,
}

impl ImagePlacement {
    /// Create a new image placement.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Fit an image inside a box, centred horizontally and pinned to the
    /// box's top edge.
    pub fn fitted(image: &ImageData, x: f32, y: f32, max_width: f32, max_height: f32) -> Self {
        let (width, height) = image.fit_to_box(max_width, max_height);
        Self::new(x + (max_width - width) / 2.0, y, width, height)
    }
}

/// Image XObject registry keyed by source path.
///
/// The same file drawn on many pages (the header logo) is embedded once.
#[derive(Debug, Default)]
pub struct ImageManager {
    images: Vec<(String, ImageData)>,
    by_path: HashMap<PathBuf, usize>,
}

impl ImageManager {
    /// Create a new image manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image and return its resource ID (`Im1`, `Im2`, ...).
    pub fn register(&mut self, image: ImageData) -> String {
        let resource_id = format!("Im{}", self.images.len() + 1);
        self.images.push((resource_id.clone(), image));
        resource_id
    }

    /// Load and register an image from file, reusing an earlier load of the
    /// same path.
    pub fn register_from_file(&mut self, path: impl AsRef<Path>) -> Result<String, ImageError> {
        let path = path.as_ref();
        if let Some(&index) = self.by_path.get(path) {
            return Ok(self.images[index].0.clone());
        }
        let image = ImageData::from_file(path)?;
        let resource_id = self.register(image);
        self.by_path.insert(path.to_path_buf(), self.images.len() - 1);
        Ok(resource_id)
    }

    /// Get an image by resource ID.
    pub fn get(&self, resource_id: &str) -> Option<&ImageData> {
        self.images
            .iter()
            .find(|(id, _)| id == resource_id)
            .map(|(_, image)| image)
    }

    /// Iterate over all images with resource IDs, in registration order.
    pub fn images_with_ids(&self) -> impl Iterator<Item = (&str, &ImageData)> {
        self.images.iter().map(|(id, image)| (id.as_str(), image))
    }

    /// Get the number of registered images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Check if any images are registered.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(image: image::DynamicImage) -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        image.write_to(&mut out, image::ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_color_space_components() {
        assert_eq!(ColorSpace::DeviceGray.components(), 1);
        assert_eq!(ColorSpace::DeviceRGB.components(), 3);
        assert_eq!(ColorSpace::DeviceCMYK.components(), 4);
    }

    #[test]
    fn test_image_fit_to_box() {
        // 2:1 chart into a tall box: width-bound
        let chart = ImageData::new(800, 400, ColorSpace::DeviceRGB, vec![]);
        let (w, h) = chart.fit_to_box(190.0, 200.0);
        assert!((w - 190.0).abs() < 0.001);
        assert!((h - 95.0).abs() < 0.001);

        // Same chart into a short box: height-bound
        let (w, h) = chart.fit_to_box(190.0, 50.0);
        assert!((w - 100.0).abs() < 0.001);
        assert!((h - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_fitted_placement_is_centred() {
        let chart = ImageData::new(100, 100, ColorSpace::DeviceRGB, vec![]);
        let placement = ImagePlacement::fitted(&chart, 10.0, 40.0, 190.0, 100.0);
        assert_eq!(placement, ImagePlacement::new(55.0, 40.0, 100.0, 100.0));
    }

    #[test]
    fn test_png_rgb_has_no_soft_mask() {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            4,
            2,
            image::Rgb([142, 127, 85]),
        ));
        let data = ImageData::from_bytes(&png_bytes(img)).unwrap();
        assert_eq!(data.format, ImageFormat::Png);
        assert_eq!(data.color_space, ColorSpace::DeviceRGB);
        assert_eq!((data.width, data.height), (4, 2));
        assert!(data.soft_mask.is_none());

        let dict = data.build_xobject_dict();
        assert_eq!(dict.get("Filter"), Some(&Object::Name("FlateDecode".to_string())));
        assert!(!dict.contains_key("DecodeParms"));
    }

    #[test]
    fn test_png_alpha_becomes_soft_mask() {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            3,
            3,
            image::Rgba([0, 0, 0, 128]),
        ));
        let data = ImageData::from_png(&png_bytes(img)).unwrap();
        assert!(data.soft_mask.is_some());
        assert!(data.build_soft_mask_dict().is_some());
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            ImageData::from_bytes(b"GIF89a"),
            Err(ImageError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_invalid_jpeg_header() {
        assert!(ImageData::from_jpeg(vec![0xFF, 0xD8, 0x00]).is_err());
    }

    #[test]
    fn test_manager_reuses_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        let img = image::DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
            2,
            2,
            image::Luma([10]),
        ));
        std::fs::write(&path, png_bytes(img)).unwrap();

        let mut manager = ImageManager::new();
        let first = manager.register_from_file(&path).unwrap();
        let second = manager.register_from_file(&path).unwrap();
        assert_eq!(first, "Im1");
        assert_eq!(first, second);
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.get("Im1").map(|i| i.color_space), Some(ColorSpace::DeviceGray));
    }
}
