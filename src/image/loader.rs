use crate::utils::error::AgriError;
use crate::Result;
use base64::Engine;
use image::{DynamicImage, ImageFormat, ImageReader, Limits};
use std::io::Cursor;

/// 上传图像的最大字节数
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// 单边最大像素数
pub const MAX_IMAGE_DIMENSION: u32 = 4096;

/// 解码时允许的最大内存（4096x4096 RGB 约48MB）
pub const MAX_DECODE_ALLOC: u64 = 64 * 1024 * 1024;

pub struct ImageLoader;

impl ImageLoader {
    /// 从base64字符串加载图像
    pub fn from_base64(base64_data: &str) -> Result<DynamicImage> {
        // 检测并移除可能的数据URL前缀 (data:image/xxx;base64,)
        let base64_clean = if base64_data.starts_with("data:") {
            base64_data.split(',').nth(1).unwrap_or(base64_data)
        } else {
            base64_data
        };

        let image_bytes = base64::engine::general_purpose::STANDARD.decode(base64_clean.trim())?;

        Self::from_bytes(&image_bytes)
    }

    /// 从字节流加载图像（仅接受JPEG）
    pub fn from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AgriError::FileTooLarge(bytes.len(), MAX_IMAGE_BYTES));
        }

        match Self::detect_format(bytes) {
            Some(format) if Self::is_supported_format(format) => {}
            Some(format) => {
                return Err(AgriError::UnsupportedFormat(format!(
                    "{:?} images are not accepted, upload a JPEG",
                    format
                )))
            }
            None => {
                return Err(AgriError::UnsupportedFormat(
                    "unrecognized image data, upload a JPEG".to_string(),
                ))
            }
        }

        // 先只读取头部尺寸，超限的图像不进入解码
        let (width, height) =
            ImageReader::with_format(Cursor::new(bytes), ImageFormat::Jpeg).into_dimensions()?;
        Self::validate_dimensions(width, height)?;

        let mut limits = Limits::default();
        limits.max_image_width = Some(MAX_IMAGE_DIMENSION);
        limits.max_image_height = Some(MAX_IMAGE_DIMENSION);
        limits.max_alloc = Some(MAX_DECODE_ALLOC);

        let mut reader = ImageReader::with_format(Cursor::new(bytes), ImageFormat::Jpeg);
        reader.limits(limits);
        let image = reader.decode()?;

        Ok(image)
    }

    /// 检测图像格式
    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    /// 验证图像格式是否支持
    pub fn is_supported_format(format: ImageFormat) -> bool {
        matches!(format, ImageFormat::Jpeg)
    }

    /// 验证图像尺寸
    pub fn validate_dimensions(width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(AgriError::InvalidInput(format!(
                "Image has no pixels: {}x{}",
                width, height
            )));
        }

        if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
            return Err(AgriError::InvalidInput(format!(
                "Image too large: {}x{}, maximum {}x{}",
                width, height, MAX_IMAGE_DIMENSION, MAX_IMAGE_DIMENSION
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn decodes_jpeg_bytes() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([10, 200, 30])));
        let decoded = ImageLoader::from_bytes(&encode(&image, ImageFormat::Jpeg)).unwrap();
        assert_eq!(decoded.dimensions(), (40, 30));
    }

    #[test]
    fn accepts_data_url_base64() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(16, 16));
        let encoded = base64::engine::general_purpose::STANDARD.encode(encode(&image, ImageFormat::Jpeg));
        let data_url = format!("data:image/jpeg;base64,{}", encoded);
        assert!(ImageLoader::from_base64(&data_url).is_ok());
    }

    #[test]
    fn rejects_png_uploads() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(16, 16));
        let err = ImageLoader::from_bytes(&encode(&image, ImageFormat::Png)).unwrap_err();
        assert!(matches!(err, AgriError::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_garbage_bytes() {
        let err = ImageLoader::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AgriError::UnsupportedFormat(_)));
    }

    #[test]
    fn jpeg_header_without_body_fails_at_decode() {
        let bytes = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x00, 0x00, 0x00];
        let err = ImageLoader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, AgriError::ImageDecode(_)));
    }

    #[test]
    fn invalid_base64_is_reported() {
        let err = ImageLoader::from_base64("***").unwrap_err();
        assert!(matches!(err, AgriError::Base64(_)));
    }

    #[test]
    fn oversized_dimensions_are_rejected_before_decode() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(MAX_IMAGE_DIMENSION + 1, 16));
        let bytes = encode(&image, ImageFormat::Jpeg);
        assert!(bytes.len() < MAX_IMAGE_BYTES);

        let err = ImageLoader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, AgriError::InvalidInput(msg) if msg.contains("too large")));
    }

    #[test]
    fn dimension_limits() {
        assert!(ImageLoader::validate_dimensions(MAX_IMAGE_DIMENSION, MAX_IMAGE_DIMENSION).is_ok());
        assert!(ImageLoader::validate_dimensions(8192, 8192).is_err());
        assert!(ImageLoader::validate_dimensions(0, 10).is_err());
    }
}
