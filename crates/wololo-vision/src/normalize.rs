//! 업로드용 이미지 정규화.
//!
//! RGB8 변환 → 최대 변 길이로 축소 (fast_image_resize) → 고정 품질 JPEG 재인코딩.

use fast_image_resize::{images::Image as FirImage, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::path::Path;
use tracing::debug;

use wololo_core::error::CoreError;

/// 정규화 옵션
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// 긴 변의 최대 길이 (픽셀)
    pub max_dimension: u32,
    /// JPEG 품질 (1-100)
    pub jpeg_quality: u8,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_dimension: 1024,
            jpeg_quality: 85,
        }
    }
}

/// 이미지 파일을 읽어 정규화된 JPEG 바이트를 반환
pub fn normalize_file(path: &Path, options: NormalizeOptions) -> Result<Vec<u8>, CoreError> {
    let bytes = std::fs::read(path)?;
    normalize_bytes(&bytes, options)
}

/// 인코딩된 이미지 바이트 → 정규화된 JPEG 바이트
pub fn normalize_bytes(bytes: &[u8], options: NormalizeOptions) -> Result<Vec<u8>, CoreError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| CoreError::Image(format!("이미지 디코딩 실패: {e}")))?;
    let rgb = decoded.to_rgb8();
    let (src_w, src_h) = rgb.dimensions();

    let (dst_w, dst_h) = fit_within(src_w, src_h, options.max_dimension);
    let resized = if (dst_w, dst_h) == (src_w, src_h) {
        rgb
    } else {
        resize_rgb(rgb, dst_w, dst_h)?
    };

    let encoded = encode_jpeg(&resized, options.jpeg_quality)?;
    debug!(
        "이미지 정규화: {}x{} → {}x{} ({} bytes)",
        src_w,
        src_h,
        dst_w,
        dst_h,
        encoded.len()
    );
    Ok(encoded)
}

/// RGB 이미지 → JPEG 바이트
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .encode_image(image)
        .map_err(|e| CoreError::Image(format!("JPEG 인코딩 실패: {e}")))?;
    Ok(buf)
}

/// 비율을 유지하며 긴 변이 `max_dimension` 이하가 되는 크기
fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if max_dimension == 0 || longest <= max_dimension {
        return (width, height);
    }
    let scale = f64::from(max_dimension) / f64::from(longest);
    let w = ((f64::from(width) * scale).round() as u32).max(1);
    let h = ((f64::from(height) * scale).round() as u32).max(1);
    (w, h)
}

fn resize_rgb(src: RgbImage, width: u32, height: u32) -> Result<RgbImage, CoreError> {
    let (src_w, src_h) = src.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(CoreError::Image("소스 이미지 크기 0".to_string()));
    }

    let src_image = FirImage::from_vec_u8(src_w, src_h, src.into_raw(), PixelType::U8x3)
        .map_err(|e| CoreError::Image(format!("소스 이미지 생성 실패: {e}")))?;
    let mut dst_image = FirImage::new(width, height, PixelType::U8x3);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(
        fast_image_resize::FilterType::Bilinear,
    ));
    Resizer::new()
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| CoreError::Image(format!("리사이즈 실패: {e}")))?;

    RgbImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| CoreError::Image("결과 이미지 생성 실패".to_string()))
}
