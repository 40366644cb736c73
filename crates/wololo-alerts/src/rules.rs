//! 알림 규칙 평가기.
//!
//! 게임 상태 하나에 대해 다섯 규칙을 독립적으로 평가한다. 출력 순서는
//! 규칙 순서(인구 → 주민 → 돌 → 시대별 자원 → 유휴 주민)를 따른다.
//! `CooldownState` 외에는 부작용이 없다.

use std::time::{Duration, Instant};
use tracing::warn;

use wololo_core::models::alert::{AlertEvent, AlertKind, AudioCue, FlashColor, FlashSpec};
use wololo_core::models::game_state::{Age, GameState, Resource, ResourceAmount};

/// 최대 인구: 이 한도에서는 집 경고를 내지 않는다.
pub const MAX_HOUSE_CAP: u32 = 200;

/// 규칙 임계값
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleThresholds {
    /// 주민 부족 경고 최소 간격
    pub low_villager_interval: Duration,
    /// 성 시대 이후 목표 주민 수
    pub villager_target: u32,
    /// 돌 과잉 기준 (초과)
    pub floating_stone: u32,
    /// 성 시대 자원 과잉 기준 (이상)
    pub castle_float: u32,
    /// 제국 시대 자원 과잉 기준 (이상)
    pub imperial_float: u32,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            low_villager_interval: Duration::from_secs(50),
            villager_target: 100,
            floating_stone: 650,
            castle_float: 1000,
            imperial_float: 2000,
        }
    }
}

/// 규칙 쿨다운 상태: 폴링 루프가 소유하고 평가기만 수정한다.
#[derive(Debug, Clone, Default)]
pub struct CooldownState {
    last_low_villager: Option<Instant>,
    ages_reached: [bool; Age::COUNT],
}

impl CooldownState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이번 세션에서 처음 본 시대면 true. 인식 불가 시대는 무시.
    pub fn observe_age(&mut self, age: Option<Age>) -> bool {
        let Some(age) = age else {
            return false;
        };
        let seen = &mut self.ages_reached[age.index()];
        let first = !*seen;
        *seen = true;
        first
    }

    /// 주민 부족 경고 마지막 발생 시각
    pub fn last_low_villager(&self) -> Option<Instant> {
        self.last_low_villager
    }
}

/// 인구 여유분: 인구가 많을수록 생산 속도가 빨라 여유를 크게 잡는다.
pub fn house_buffer(units: u32) -> u32 {
    let extra = if units > 125 {
        15
    } else if units > 75 {
        10
    } else if units > 50 {
        5
    } else {
        0
    };
    3 + extra
}

/// 규칙 평가기
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluator {
    thresholds: RuleThresholds,
}

impl RuleEvaluator {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    /// 모든 규칙 평가
    pub fn evaluate(
        &self,
        state: &GameState,
        cooldowns: &mut CooldownState,
        now: Instant,
    ) -> Vec<AlertEvent> {
        let mut alerts = Vec::new();

        if let Some(alert) = self.check_house_limit(state) {
            alerts.push(alert);
        }
        if let Some(alert) = self.check_low_villagers(state, cooldowns, now) {
            alerts.push(alert);
        }
        if let Some(alert) = self.check_floating_stone(state) {
            alerts.push(alert);
        }
        alerts.extend(self.check_floating_by_age(state));
        if let Some(alert) = self.check_idle_villagers(state) {
            alerts.push(alert);
        }

        alerts
    }

    fn check_house_limit(&self, state: &GameState) -> Option<AlertEvent> {
        let units = state.total_units;
        let cap = state.house_limit;
        if units == 0 || cap == MAX_HOUSE_CAP {
            return None;
        }

        let headroom = i64::from(cap) - i64::from(units);
        if units != cap && headroom > i64::from(house_buffer(units)) {
            return None;
        }

        Some(AlertEvent {
            kind: AlertKind::HouseLimit,
            audio: Some(AudioCue::new("maison.mp3")),
            flash: FlashSpec::banner(FlashColor::Yellow, 100, "Build Houses!"),
            description: format!("House limit warning triggered: {units}/{cap}"),
        })
    }

    fn check_low_villagers(
        &self,
        state: &GameState,
        cooldowns: &mut CooldownState,
        now: Instant,
    ) -> Option<AlertEvent> {
        if !matches!(state.age, Some(Age::Castle | Age::Imperial)) {
            return None;
        }
        if state.villagers >= self.thresholds.villager_target {
            return None;
        }
        if let Some(last) = cooldowns.last_low_villager {
            if now.saturating_duration_since(last) < self.thresholds.low_villager_interval {
                return None;
            }
        }

        cooldowns.last_low_villager = Some(now);
        Some(AlertEvent {
            kind: AlertKind::LowVillagers,
            audio: Some(AudioCue::new("villageois.mp3")),
            flash: FlashSpec::banner(FlashColor::Orange, 100, "Create Villagers!"),
            description: format!(
                "Low villager count warning: {} villagers in {}",
                state.villagers,
                state.age.map(|a| a.to_string()).unwrap_or_default()
            ),
        })
    }

    fn check_floating_stone(&self, state: &GameState) -> Option<AlertEvent> {
        let stone = readable(Resource::Stone, state.resources.reading(Resource::Stone)?)?;
        if stone <= self.thresholds.floating_stone {
            return None;
        }

        Some(AlertEvent {
            kind: AlertKind::FloatingResource(Resource::Stone),
            audio: Some(AudioCue::new("floating_stone.mp3")),
            flash: FlashSpec::banner(FlashColor::Grey, 200, "Use Stone!"),
            description: format!("Floating stone warning triggered: {stone} stone"),
        })
    }

    fn check_floating_by_age(&self, state: &GameState) -> Vec<AlertEvent> {
        let threshold = match state.age {
            Some(Age::Castle) => self.thresholds.castle_float,
            Some(Age::Imperial) => self.thresholds.imperial_float,
            _ => return Vec::new(),
        };

        let mut alerts = Vec::new();
        for (resource, amount) in state.resources.iter() {
            let Some(value) = readable(resource, amount) else {
                continue;
            };
            if value < threshold {
                continue;
            }

            let file = format!("floating_{}.mp3", resource.as_str().to_lowercase());
            alerts.push(AlertEvent {
                kind: AlertKind::FloatingResource(resource),
                audio: Some(AudioCue::new(file)),
                flash: FlashSpec::banner(
                    FlashColor::for_resource(resource),
                    300,
                    format!("Use {resource}!"),
                ),
                description: format!(
                    "Floating {resource} warning triggered: {value} {resource} in {}",
                    state.age.map(|a| a.to_string()).unwrap_or_default()
                ),
            });
        }
        alerts
    }

    fn check_idle_villagers(&self, state: &GameState) -> Option<AlertEvent> {
        let idle = state.idle_villagers;
        if idle == 0 {
            return None;
        }

        let text = if idle == 1 {
            "1 Idle Villager!".to_string()
        } else {
            format!("{idle} Idle Villagers!")
        };

        Some(AlertEvent {
            kind: AlertKind::IdleVillagers(idle),
            audio: Some(AudioCue::new(AudioCue::IDLE_VILLAGERS)),
            flash: FlashSpec::banner(FlashColor::Grey, 400, text),
            description: format!("Idle villagers warning triggered: {idle} idle"),
        })
    }
}

/// 판독 가능한 수량만 돌려준다. 판독 불가 값은 경고 후 `None`.
fn readable(resource: Resource, amount: &ResourceAmount) -> Option<u32> {
    match amount {
        ResourceAmount::Counted(v) => Some(*v),
        ResourceAmount::Unreadable(raw) => {
            warn!(resource = %resource, amount = %raw, "자원 수량 판독 불가, 건너뜀");
            None
        }
    }
}
