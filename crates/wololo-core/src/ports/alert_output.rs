//! 알림 출력 포트 (오디오, 화면 플래시).
//!
//! 디스패처가 호출한다. 실패는 `CoreError::Dispatch`로 반환하고
//! 디스패처는 로그만 남기고 계속 진행한다.

use crate::error::CoreError;
use crate::models::alert::{AudioCue, FlashSpec};

/// 경고음 재생기
pub trait AudioPlayer: Send + Sync {
    /// 큐를 재생 대기열에 넣는다 (재생 완료를 기다리지 않음).
    fn play(&self, cue: &AudioCue, volume: f32) -> Result<(), CoreError>;
}

/// 화면 플래시 표시기: 실제 렌더링은 호스트(UI) 스레드 담당
pub trait FlashPresenter: Send + Sync {
    fn present(&self, flash: &FlashSpec) -> Result<(), CoreError>;
}
