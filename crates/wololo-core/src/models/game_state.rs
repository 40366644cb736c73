//! 게임 상태 모델.
//!
//! 사이클마다 새로 만들어지고 규칙 평가 후 폐기된다. 저장하지 않는다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 자원 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Wood,
    Food,
    Gold,
    Stone,
}

impl Resource {
    /// 전체 자원 (고정 순서)
    pub const ALL: [Resource; 4] = [
        Resource::Wood,
        Resource::Food,
        Resource::Gold,
        Resource::Stone,
    ];

    /// 응답 JSON 키 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Wood => "Wood",
            Resource::Food => "Food",
            Resource::Gold => "Gold",
            Resource::Stone => "Stone",
        }
    }

    /// 대소문자 무시 키 매칭
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(key))
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 시대 (Dark < Feudal < Castle < Imperial)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Age {
    Dark,
    Feudal,
    Castle,
    Imperial,
}

impl Age {
    /// 시대 개수 (일회성 플래그 배열 크기)
    pub const COUNT: usize = 4;

    /// "Castle Age", "castle", " IMPERIAL AGE " 등을 인식한다.
    pub fn parse(text: &str) -> Option<Self> {
        let lowered = text.trim().to_ascii_lowercase();
        let name = lowered.strip_suffix(" age").unwrap_or(&lowered).trim();
        match name {
            "dark" => Some(Age::Dark),
            "feudal" => Some(Age::Feudal),
            "castle" => Some(Age::Castle),
            "imperial" => Some(Age::Imperial),
            _ => None,
        }
    }

    /// 배열 인덱스
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Age::Dark => "Dark Age",
            Age::Feudal => "Feudal Age",
            Age::Castle => "Castle Age",
            Age::Imperial => "Imperial Age",
        };
        f.write_str(name)
    }
}

/// 자원 수량 판독 결과
///
/// 판독 불가 값은 자원 과잉 규칙에서 경고 후 건너뛴다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceAmount {
    Counted(u32),
    Unreadable(String),
}

impl ResourceAmount {
    /// 숫자 값 (판독 불가면 None)
    pub fn value(&self) -> Option<u32> {
        match self {
            ResourceAmount::Counted(v) => Some(*v),
            ResourceAmount::Unreadable(_) => None,
        }
    }
}

/// 자원 재고: 응답에 나타난 순서를 유지한다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStock {
    readings: Vec<(Resource, ResourceAmount)>,
}

impl ResourceStock {
    /// 판독값 설정 (이미 있으면 덮어쓰되 순서는 처음 위치 유지)
    pub fn set(&mut self, resource: Resource, amount: ResourceAmount) {
        match self.readings.iter_mut().find(|(r, _)| *r == resource) {
            Some(slot) => slot.1 = amount,
            None => self.readings.push((resource, amount)),
        }
    }

    /// 숫자 수량 (없거나 판독 불가면 0)
    pub fn amount(&self, resource: Resource) -> u32 {
        self.reading(resource)
            .and_then(ResourceAmount::value)
            .unwrap_or(0)
    }

    /// 원본 판독값
    pub fn reading(&self, resource: Resource) -> Option<&ResourceAmount> {
        self.readings
            .iter()
            .find(|(r, _)| *r == resource)
            .map(|(_, a)| a)
    }

    /// 응답 순서대로 순회
    pub fn iter(&self) -> impl Iterator<Item = (Resource, &ResourceAmount)> {
        self.readings.iter().map(|(r, a)| (*r, a))
    }
}

/// 자원별 주민 수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VillagerAllocation([u32; 4]);

impl VillagerAllocation {
    pub fn get(&self, resource: Resource) -> u32 {
        self.0[resource.index()]
    }

    pub fn set(&mut self, resource: Resource, count: u32) {
        self.0[resource.index()] = count;
    }

    /// 자원 채집 중인 주민 합계
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// 한 사이클의 게임 상태 스냅샷
///
/// 모든 숫자 필드는 신호가 없으면 0 (null 없음).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// 자원 재고
    pub resources: ResourceStock,
    /// 자원별 주민 배치
    pub villagers_on_resource: VillagerAllocation,
    /// 전체 주민 수
    pub villagers: u32,
    /// 유휴 주민 수
    pub idle_villagers: u32,
    /// 전체 유닛 수 (인구)
    pub total_units: u32,
    /// 현재 인구 한도 (집)
    pub house_limit: u32,
    /// 현재 시대 (인식 불가면 None)
    pub age: Option<Age>,
    /// 경기 경과 시간
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_ordering() {
        assert!(Age::Dark < Age::Feudal);
        assert!(Age::Feudal < Age::Castle);
        assert!(Age::Castle < Age::Imperial);
    }

    #[test]
    fn age_parse_variants() {
        assert_eq!(Age::parse("Castle Age"), Some(Age::Castle));
        assert_eq!(Age::parse("  imperial age "), Some(Age::Imperial));
        assert_eq!(Age::parse("FEUDAL"), Some(Age::Feudal));
        assert_eq!(Age::parse("Dark Age"), Some(Age::Dark));
        assert_eq!(Age::parse("Post-Imperial"), None);
        assert_eq!(Age::parse(""), None);
    }

    #[test]
    fn stock_keeps_insertion_order() {
        let mut stock = ResourceStock::default();
        stock.set(Resource::Gold, ResourceAmount::Counted(5));
        stock.set(Resource::Wood, ResourceAmount::Counted(7));
        stock.set(Resource::Gold, ResourceAmount::Counted(9));

        let order: Vec<_> = stock.iter().map(|(r, _)| r).collect();
        assert_eq!(order, vec![Resource::Gold, Resource::Wood]);
        assert_eq!(stock.amount(Resource::Gold), 9);
        assert_eq!(stock.amount(Resource::Stone), 0);
    }

    #[test]
    fn unreadable_amount_counts_as_zero() {
        let mut stock = ResourceStock::default();
        stock.set(Resource::Food, ResourceAmount::Unreadable("lots".into()));
        assert_eq!(stock.amount(Resource::Food), 0);
    }

    #[test]
    fn resource_key_is_case_insensitive() {
        assert_eq!(Resource::from_key("stone"), Some(Resource::Stone));
        assert_eq!(Resource::from_key(" WOOD "), Some(Resource::Wood));
        assert_eq!(Resource::from_key("Iron"), None);
    }
}
