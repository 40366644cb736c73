//! 캡처 영역 모델.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 캡처 결과 저장 네임스페이스
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptureNamespace {
    /// 상단 자원 바
    Resources,
    /// 우하단 문명 패널
    Civilization,
}

impl CaptureNamespace {
    /// 디렉토리 이름
    pub fn dir_name(&self) -> &'static str {
        match self {
            CaptureNamespace::Resources => "resources",
            CaptureNamespace::Civilization => "civilization",
        }
    }
}

impl fmt::Display for CaptureNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// 화면 크기
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

/// 캡처 사각형 (화면 좌표)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// 상단 자원 바: (0, 0, min(1200, w), h의 5%)
    pub fn resource_bar(screen: ScreenSize) -> Self {
        Self::new(0, 0, screen.width.min(1200), percent_of(screen.height, 5))
    }

    /// 우하단 문명 패널: 너비 min(500, w), 높이 h의 25%
    pub fn civilization_panel(screen: ScreenSize) -> Self {
        let width = screen.width.min(500);
        let height = percent_of(screen.height, 25);
        Self::new(
            (screen.width - width) as i32,
            (screen.height - height) as i32,
            width,
            height,
        )
    }

    /// 화면 경계로 잘라낸 영역. 겹치는 부분이 없으면 None.
    pub fn clamp_to(&self, screen: ScreenSize) -> Option<CaptureRegion> {
        let left = i64::from(self.x).max(0);
        let top = i64::from(self.y).max(0);
        let right = (i64::from(self.x) + i64::from(self.width)).min(i64::from(screen.width));
        let bottom = (i64::from(self.y) + i64::from(self.height)).min(i64::from(screen.height));

        if right <= left || bottom <= top {
            return None;
        }

        Some(CaptureRegion::new(
            left as i32,
            top as i32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

fn percent_of(value: u32, percent: u32) -> u32 {
    ((u64::from(value) * u64::from(percent)) / 100) as u32
}
