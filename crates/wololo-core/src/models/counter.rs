//! 문명 카운터 데이터셋.
//!
//! 읽기 전용 JSON 파일에서 로드한다. 문명 이름 → 고유 유닛, 카운터 유닛,
//! 피해야 할 유닛, 팁.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

use crate::error::CoreError;

/// 카운터 목록: 유닛별 맵 또는 평면 목록 두 형식을 모두 허용한다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CounterList {
    PerUnit(BTreeMap<String, Vec<String>>),
    Flat(Vec<String>),
}

impl Default for CounterList {
    fn default() -> Self {
        CounterList::Flat(Vec::new())
    }
}

/// 문명 하나의 카운터 정보
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterEntry {
    #[serde(default)]
    pub unique_units: Vec<String>,
    #[serde(default)]
    pub counters: CounterList,
    #[serde(default)]
    pub units_to_avoid: CounterList,
    #[serde(default)]
    pub tips: String,
}

/// 카운터 데이터셋
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterDataset {
    civs: BTreeMap<String, CounterEntry>,
}

impl CounterDataset {
    /// JSON 파일에서 로드
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!(
                "카운터 데이터 파일 읽기 실패: {}: {}",
                path.display(),
                e
            ))
        })?;
        let dataset = Self::from_json(&content)?;
        debug!(civs = dataset.len(), path = %path.display(), "카운터 데이터 로드");
        Ok(dataset)
    }

    /// JSON 문자열에서 로드
    pub fn from_json(content: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn len(&self) -> usize {
        self.civs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.civs.is_empty()
    }

    /// 문명 조회 (정확히 일치 우선, 없으면 대소문자 무시)
    pub fn lookup(&self, civ: &str) -> Option<&CounterEntry> {
        let civ = civ.trim();
        self.civs.get(civ).or_else(|| {
            self.civs
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(civ))
                .map(|(_, entry)| entry)
        })
    }

    /// (플레이어, 문명) 목록을 표시용 텍스트로 렌더링
    pub fn render(&self, assignments: &[(String, String)]) -> String {
        let blocks: Vec<String> = assignments
            .iter()
            .map(|(_, civ)| match self.lookup(civ) {
                Some(entry) => render_entry(civ, entry),
                None => format!("No counter information available for {civ}."),
            })
            .collect();
        blocks.join("\n\n")
    }
}

fn render_entry(civ: &str, entry: &CounterEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {civ} ==");
    let _ = writeln!(out, "Unique Units: {}", entry.unique_units.join(", "));

    match &entry.counters {
        CounterList::PerUnit(map) => {
            for (unit, counters) in map {
                let _ = writeln!(out, "- {unit}: {}", counters.join(", "));
            }
        }
        CounterList::Flat(list) => {
            let _ = writeln!(out, "Counters: {}", list.join(", "));
        }
    }

    match &entry.units_to_avoid {
        CounterList::PerUnit(map) => {
            for (unit, avoid) in map {
                let _ = writeln!(out, "- Units to avoid for {unit}: {}", avoid.join(", "));
            }
        }
        CounterList::Flat(list) => {
            let _ = writeln!(out, "Units to avoid: {}", list.join(", "));
        }
    }

    let _ = write!(out, "Tips: {}", entry.tips);
    out
}
