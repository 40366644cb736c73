//! # wololo-vision
//!
//! 화면 캡처 어댑터와 업로드용 이미지 정규화.
//!
//! - [`capture`]: xcap 기반 영역 캡처, JPEG 저장 (`RegionCapturer` 구현)
//! - [`normalize`]: RGB8 변환, fast_image_resize 축소, JPEG 재인코딩

pub mod capture;
pub mod normalize;
