//! 입력 드라이버 구현.
//!
//! `NoOpInputDriver` (테스트/로깅용)와 `EnigoInputDriver` (실제 키보드 입력,
//! `enigo` feature)를 제공한다.

use async_trait::async_trait;
use tracing::debug;

use wololo_core::error::CoreError;
use wololo_core::ports::input_driver::InputDriver;

// ============================================================
// 키 이름 파싱
// ============================================================

/// 매크로가 사용하는 키
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Control,
    Shift,
    Alt,
    Meta,
    Escape,
    Return,
    Space,
    Tab,
    /// 단일 문자 키 (소문자로 정규화)
    Char(char),
}

/// 문자열 → 키 코드. 알 수 없는 키는 입력 에러 (게임에 엉뚱한 키를 보내지 않는다).
pub fn parse_key(key: &str) -> Result<KeyCode, CoreError> {
    let lowered = key.trim().to_lowercase();
    let code = match lowered.as_str() {
        "ctrl" | "control" => KeyCode::Control,
        "shift" => KeyCode::Shift,
        "alt" | "option" => KeyCode::Alt,
        "meta" | "command" | "cmd" | "super" | "win" => KeyCode::Meta,
        "escape" | "esc" => KeyCode::Escape,
        "enter" | "return" => KeyCode::Return,
        "space" => KeyCode::Space,
        "tab" => KeyCode::Tab,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => KeyCode::Char(ch),
                _ => return Err(CoreError::Input(format!("알 수 없는 키: {key:?}"))),
            }
        }
    };
    Ok(code)
}

// ============================================================
// NoOpInputDriver: 테스트/디버깅용
// ============================================================

/// No-Op 입력 드라이버: 모든 입력을 로깅만 하고 실행하지 않음
pub struct NoOpInputDriver;

#[async_trait]
impl InputDriver for NoOpInputDriver {
    async fn key_press(&self, key: &str) -> Result<(), CoreError> {
        parse_key(key)?;
        debug!(key, "[NoOp] 키 누름");
        Ok(())
    }

    async fn key_release(&self, key: &str) -> Result<(), CoreError> {
        parse_key(key)?;
        debug!(key, "[NoOp] 키 놓음");
        Ok(())
    }

    async fn hotkey(&self, keys: &[String]) -> Result<(), CoreError> {
        for key in keys {
            parse_key(key)?;
        }
        debug!(?keys, "[NoOp] 단축키 실행");
        Ok(())
    }

    fn platform(&self) -> &str {
        "noop"
    }
}

// ============================================================
// EnigoInputDriver: 실제 키보드 입력
// ============================================================

/// 실제 키보드 입력 드라이버 (enigo 기반)
///
/// macOS: Accessibility 권한 필요
/// Windows: 게임이 관리자 권한이면 동일 권한 필요
/// Linux: X11 또는 Wayland + uinput 권한 필요
#[cfg(feature = "enigo")]
pub struct EnigoInputDriver {
    /// enigo 인스턴스 (Send지만 !Sync → tokio::sync::Mutex 사용)
    enigo: tokio::sync::Mutex<enigo::Enigo>,
}

#[cfg(feature = "enigo")]
impl EnigoInputDriver {
    pub fn new() -> Result<Self, CoreError> {
        let settings = enigo::Settings::default();
        let enigo = enigo::Enigo::new(&settings)
            .map_err(|e| CoreError::Input(format!("입력 드라이버 초기화 실패: {e}")))?;
        Ok(Self {
            enigo: tokio::sync::Mutex::new(enigo),
        })
    }

    fn to_enigo(key: &str) -> Result<enigo::Key, CoreError> {
        Ok(match parse_key(key)? {
            KeyCode::Control => enigo::Key::Control,
            KeyCode::Shift => enigo::Key::Shift,
            KeyCode::Alt => enigo::Key::Alt,
            KeyCode::Meta => enigo::Key::Meta,
            KeyCode::Escape => enigo::Key::Escape,
            KeyCode::Return => enigo::Key::Return,
            KeyCode::Space => enigo::Key::Space,
            KeyCode::Tab => enigo::Key::Tab,
            KeyCode::Char(ch) => enigo::Key::Unicode(ch),
        })
    }

    async fn send(&self, key: &str, direction: enigo::Direction) -> Result<(), CoreError> {
        use enigo::Keyboard;
        let code = Self::to_enigo(key)?;
        let mut enigo = self.enigo.lock().await;
        enigo
            .key(code, direction)
            .map_err(|e| CoreError::Input(format!("키 입력 실패 ({key}): {e}")))
    }
}

#[cfg(feature = "enigo")]
#[async_trait]
impl InputDriver for EnigoInputDriver {
    async fn key_press(&self, key: &str) -> Result<(), CoreError> {
        debug!(key, "[Enigo] 키 누름");
        self.send(key, enigo::Direction::Press).await
    }

    async fn key_release(&self, key: &str) -> Result<(), CoreError> {
        debug!(key, "[Enigo] 키 놓음");
        self.send(key, enigo::Direction::Release).await
    }

    async fn hotkey(&self, keys: &[String]) -> Result<(), CoreError> {
        use enigo::Keyboard;
        debug!(?keys, "[Enigo] 단축키 실행");
        let codes = keys
            .iter()
            .map(|k| Self::to_enigo(k))
            .collect::<Result<Vec<_>, _>>()?;

        let mut enigo = self.enigo.lock().await;
        for code in &codes {
            enigo
                .key(*code, enigo::Direction::Press)
                .map_err(|e| CoreError::Input(format!("단축키 Press 실패: {e}")))?;
        }
        for code in codes.iter().rev() {
            enigo
                .key(*code, enigo::Direction::Release)
                .map_err(|e| CoreError::Input(format!("단축키 Release 실패: {e}")))?;
        }
        Ok(())
    }

    fn platform(&self) -> &str {
        std::env::consts::OS
    }
}

/// 플랫폼별 입력 드라이버 생성 팩토리
///
/// `enigo` feature 활성화 시 실제 입력 드라이버, 아니면 NoOp 드라이버.
pub fn create_platform_input_driver() -> Box<dyn InputDriver> {
    #[cfg(feature = "enigo")]
    {
        match EnigoInputDriver::new() {
            Ok(driver) => {
                tracing::info!("실제 입력 드라이버 (enigo) 초기화 완료");
                return Box::new(driver);
            }
            Err(e) => {
                tracing::warn!("enigo 초기화 실패, NoOp 폴백: {e}");
            }
        }
    }
    Box::new(NoOpInputDriver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_modifiers_and_chars() {
        assert_eq!(parse_key("Ctrl").unwrap(), KeyCode::Control);
        assert_eq!(parse_key("shift").unwrap(), KeyCode::Shift);
        assert_eq!(parse_key("H").unwrap(), KeyCode::Char('h'));
        assert_eq!(parse_key(" q ").unwrap(), KeyCode::Char('q'));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(matches!(parse_key("hyper"), Err(CoreError::Input(_))));
        assert!(parse_key("").is_err());
    }

    #[tokio::test]
    async fn noop_driver_accepts_macro_keys() {
        let driver = NoOpInputDriver;
        assert!(driver
            .hotkey(&["ctrl".to_string(), "shift".to_string(), "h".to_string()])
            .await
            .is_ok());
        assert!(driver.key_tap("q").await.is_ok());
        assert!(driver.key_press("bogus-key").await.is_err());
    }

    #[test]
    fn factory_creates_driver() {
        let driver = create_platform_input_driver();
        assert!(!driver.platform().is_empty());
    }
}
