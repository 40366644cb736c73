//! 알림 이벤트 모델.
//!
//! 규칙 평가기가 생성하고 디스패처가 한 번 소비한다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::game_state::Resource;

/// 알림 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// 인구 한도 임박
    HouseLimit,
    /// 성 시대 이후 주민 부족
    LowVillagers,
    /// 자원 과잉
    FloatingResource(Resource),
    /// 유휴 주민
    IdleVillagers(u32),
}

impl AlertKind {
    /// 텔레메트리 액션 타입
    pub fn action_type(&self) -> &'static str {
        match self {
            AlertKind::HouseLimit => "house_limit_warning",
            AlertKind::LowVillagers => "low_villager_count_warning",
            AlertKind::FloatingResource(Resource::Wood) => "floating_wood_warning",
            AlertKind::FloatingResource(Resource::Food) => "floating_food_warning",
            AlertKind::FloatingResource(Resource::Gold) => "floating_gold_warning",
            AlertKind::FloatingResource(Resource::Stone) => "floating_stone_warning",
            AlertKind::IdleVillagers(_) => "idle_villagers_warning",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::HouseLimit => f.write_str("HouseLimit"),
            AlertKind::LowVillagers => f.write_str("LowVillagers"),
            AlertKind::FloatingResource(r) => write!(f, "FloatingResource({r})"),
            AlertKind::IdleVillagers(n) => write!(f, "IdleVillagers({n})"),
        }
    }
}

/// 오디오 큐: 경고음 파일 이름 (오디오 디렉토리 기준 상대 경로)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioCue(String);

impl AudioCue {
    /// 유휴 주민 경고음 (별도 토글로 제어)
    pub const IDLE_VILLAGERS: &'static str = "idle_villagers.wav";

    pub fn new(file_name: impl Into<String>) -> Self {
        Self(file_name.into())
    }

    pub fn file_name(&self) -> &str {
        &self.0
    }

    /// 유휴 주민 경고음 여부
    pub fn is_idle_villager_cue(&self) -> bool {
        self.0 == Self::IDLE_VILLAGERS
    }
}

impl fmt::Display for AudioCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 플래시 색상
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashColor {
    Yellow,
    Orange,
    Grey,
    Brown,
    Red,
    Gold,
    Blue,
}

impl FlashColor {
    /// 자원별 기본 색상
    pub fn for_resource(resource: Resource) -> Self {
        match resource {
            Resource::Wood => FlashColor::Brown,
            Resource::Food => FlashColor::Red,
            Resource::Gold => FlashColor::Gold,
            Resource::Stone => FlashColor::Grey,
        }
    }

    /// 오버레이 렌더러용 RGB 값
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            FlashColor::Yellow => (255, 255, 0),
            FlashColor::Orange => (255, 165, 0),
            FlashColor::Grey => (128, 128, 128),
            FlashColor::Brown => (165, 42, 42),
            FlashColor::Red => (255, 0, 0),
            FlashColor::Gold => (255, 215, 0),
            FlashColor::Blue => (0, 0, 255),
        }
    }
}

/// 화면 플래시 명세: 호스트(UI) 스레드가 오버레이 창으로 렌더링한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashSpec {
    pub color: FlashColor,
    pub duration: Duration,
    /// 화면 좌표 (x, y)
    pub position: (i32, i32),
    /// 크기 (width, height)
    pub size: (u32, u32),
    /// 0.0 ~ 1.0
    pub opacity: f32,
    pub text: String,
}

impl FlashSpec {
    /// 기본 플래시 (2초, 300x100, 불투명도 0.8)
    pub fn banner(color: FlashColor, y: i32, text: impl Into<String>) -> Self {
        Self {
            color,
            duration: Duration::from_secs(2),
            position: (0, y),
            size: (300, 100),
            opacity: 0.8,
            text: text.into(),
        }
    }
}

/// 알림 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub audio: Option<AudioCue>,
    pub flash: FlashSpec,
    /// 텔레메트리용 설명
    pub description: String,
}
