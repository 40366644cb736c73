//! 알림 출력 토글.
//!
//! 호스트 스레드가 쓰고 폴링 루프가 읽는다. 디스패처는 드레인마다
//! 스냅샷 하나를 받아서 쓴다.

use std::sync::atomic::{AtomicBool, Ordering};

use wololo_core::config::AlertConfig;

/// 드레인 한 번 동안 고정되는 설정 스냅샷
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertSettings {
    pub audio_enabled: bool,
    pub flash_enabled: bool,
    pub idle_villager_audio_enabled: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            flash_enabled: true,
            idle_villager_audio_enabled: true,
        }
    }
}

/// 런타임 토글
#[derive(Debug)]
pub struct AlertToggles {
    audio: AtomicBool,
    flash: AtomicBool,
    idle_villager_audio: AtomicBool,
}

impl AlertToggles {
    pub fn new(settings: AlertSettings) -> Self {
        Self {
            audio: AtomicBool::new(settings.audio_enabled),
            flash: AtomicBool::new(settings.flash_enabled),
            idle_villager_audio: AtomicBool::new(settings.idle_villager_audio_enabled),
        }
    }

    pub fn from_config(config: &AlertConfig) -> Self {
        Self::new(AlertSettings {
            audio_enabled: config.audio_enabled,
            flash_enabled: config.flash_enabled,
            idle_villager_audio_enabled: config.idle_villager_audio_enabled,
        })
    }

    pub fn set_audio(&self, enabled: bool) {
        self.audio.store(enabled, Ordering::Relaxed);
    }

    pub fn set_flash(&self, enabled: bool) {
        self.flash.store(enabled, Ordering::Relaxed);
    }

    pub fn set_idle_villager_audio(&self, enabled: bool) {
        self.idle_villager_audio.store(enabled, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> AlertSettings {
        AlertSettings {
            audio_enabled: self.audio.load(Ordering::Relaxed),
            flash_enabled: self.flash.load(Ordering::Relaxed),
            idle_villager_audio_enabled: self.idle_villager_audio.load(Ordering::Relaxed),
        }
    }
}

impl Default for AlertToggles {
    fn default() -> Self {
        Self::new(AlertSettings::default())
    }
}
