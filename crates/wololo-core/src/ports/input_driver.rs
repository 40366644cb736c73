//! 입력 드라이버 포트.
//!
//! 게임 매크로용 키보드 시뮬레이션 인터페이스.

use async_trait::async_trait;

use crate::error::CoreError;

/// 입력 드라이버: 키보드 시뮬레이션
///
/// 구현체: `EnigoInputDriver` (실제 입력), `NoOpInputDriver` (테스트용)
#[async_trait]
pub trait InputDriver: Send + Sync {
    /// 키 누름
    async fn key_press(&self, key: &str) -> Result<(), CoreError>;

    /// 키 놓음
    async fn key_release(&self, key: &str) -> Result<(), CoreError>;

    /// 단일 키 탭 (누름 + 놓음)
    async fn key_tap(&self, key: &str) -> Result<(), CoreError> {
        self.key_press(key).await?;
        self.key_release(key).await
    }

    /// 단축키: 순서대로 누르고 역순으로 놓는다.
    async fn hotkey(&self, keys: &[String]) -> Result<(), CoreError>;

    /// 플랫폼 이름 (예: "macos", "windows", "linux")
    fn platform(&self) -> &str;
}
