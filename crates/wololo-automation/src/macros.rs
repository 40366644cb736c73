//! 게임 매크로.
//!
//! 단축키 하나로 "전체 건물 선택 → 생산 명령"을 보낸다. 단축키 등록은
//! 호스트 담당이고 여기서는 키 시퀀스만 실행한다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use wololo_core::config::AutomationConfig;
use wololo_core::error::CoreError;
use wololo_core::ports::input_driver::InputDriver;

/// 생산 명령 키 (건물 선택 후 첫 번째 슬롯)
const TRAIN_KEY: &str = "q";

/// 매크로 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMacro {
    /// 모든 마을회관 선택 (Ctrl+Shift+H) → 주민 생산 (Q)
    TrainVillager,
    /// 모든 성 선택 (Ctrl+Shift+C) → 고유 유닛 생산 (Q)
    TrainUniqueUnit,
}

impl GameMacro {
    /// 건물 전체 선택 단축키
    fn select_keys(&self) -> Vec<String> {
        let building = match self {
            GameMacro::TrainVillager => "h",
            GameMacro::TrainUniqueUnit => "c",
        };
        ["ctrl", "shift", building]
            .iter()
            .map(|k| k.to_string())
            .collect()
    }

    /// 텔레메트리 액션 타입
    pub fn action_type(&self) -> &'static str {
        match self {
            GameMacro::TrainVillager => "create_villager",
            GameMacro::TrainUniqueUnit => "create_unique_unit",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// 매크로 실행기: 매크로별 활성화 토글은 호스트 스레드에서 바꿀 수 있다.
pub struct MacroRunner {
    driver: Arc<dyn InputDriver>,
    enabled: [AtomicBool; 2],
    settle_delay: Duration,
}

impl MacroRunner {
    pub fn new(driver: Arc<dyn InputDriver>, config: &AutomationConfig) -> Self {
        Self {
            driver,
            enabled: [
                AtomicBool::new(config.villager_macro_enabled),
                AtomicBool::new(config.unique_unit_macro_enabled),
            ],
            settle_delay: Duration::from_millis(100),
        }
    }

    /// 단축키를 뗀 뒤 게임이 입력을 받을 때까지 기다리는 시간
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn set_enabled(&self, game_macro: GameMacro, enabled: bool) {
        self.enabled[game_macro.index()].store(enabled, Ordering::Relaxed);
        info!(?game_macro, enabled, "매크로 토글");
    }

    pub fn is_enabled(&self, game_macro: GameMacro) -> bool {
        self.enabled[game_macro.index()].load(Ordering::Relaxed)
    }

    /// 매크로 실행. 비활성 상태면 아무것도 보내지 않고 `Ok(false)`.
    pub async fn run(&self, game_macro: GameMacro) -> Result<bool, CoreError> {
        if !self.is_enabled(game_macro) {
            debug!(?game_macro, "비활성 매크로, 생략");
            return Ok(false);
        }

        tokio::time::sleep(self.settle_delay).await;
        self.driver.hotkey(&game_macro.select_keys()).await?;
        self.driver.key_tap(TRAIN_KEY).await?;

        debug!(?game_macro, platform = self.driver.platform(), "매크로 실행 완료");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// 입력을 기록만 하는 드라이버
    #[derive(Default)]
    struct RecordingDriver {
        events: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl InputDriver for RecordingDriver {
        async fn key_press(&self, key: &str) -> Result<(), CoreError> {
            self.events.lock().push(format!("down:{key}"));
            Ok(())
        }

        async fn key_release(&self, key: &str) -> Result<(), CoreError> {
            self.events.lock().push(format!("up:{key}"));
            Ok(())
        }

        async fn hotkey(&self, keys: &[String]) -> Result<(), CoreError> {
            self.events.lock().push(format!("hotkey:{}", keys.join("+")));
            Ok(())
        }

        fn platform(&self) -> &str {
            "recording"
        }
    }

    fn runner(config: AutomationConfig) -> (Arc<RecordingDriver>, MacroRunner) {
        let driver = Arc::new(RecordingDriver::default());
        let runner = MacroRunner::new(driver.clone(), &config);
        (driver, runner)
    }

    #[tokio::test(start_paused = true)]
    async fn villager_macro_selects_town_centers_then_trains() {
        let (driver, runner) = runner(AutomationConfig::default());
        assert!(runner.run(GameMacro::TrainVillager).await.unwrap());
        assert_eq!(
            *driver.events.lock(),
            vec!["hotkey:ctrl+shift+h", "down:q", "up:q"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unique_unit_macro_selects_castles() {
        let (driver, runner) = runner(AutomationConfig::default());
        runner.run(GameMacro::TrainUniqueUnit).await.unwrap();
        assert_eq!(driver.events.lock()[0], "hotkey:ctrl+shift+c");
    }

    #[tokio::test]
    async fn disabled_macro_sends_nothing() {
        let config = AutomationConfig {
            villager_macro_enabled: false,
            ..AutomationConfig::default()
        };
        let (driver, runner) = runner(config);
        assert!(!runner.run(GameMacro::TrainVillager).await.unwrap());
        assert!(driver.events.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_at_runtime() {
        let (driver, runner) = runner(AutomationConfig::default());
        runner.set_enabled(GameMacro::TrainUniqueUnit, false);
        assert!(!runner.run(GameMacro::TrainUniqueUnit).await.unwrap());
        runner.set_enabled(GameMacro::TrainUniqueUnit, true);
        assert!(runner.run(GameMacro::TrainUniqueUnit).await.unwrap());
        assert_eq!(driver.events.lock().len(), 3);
    }
}
