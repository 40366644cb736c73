//! 게임 상태 파서.
//!
//! 모델 응답 텍스트를 [`GameState`]로 변환한다. JSON 디코딩은 엄격하게,
//! 필드 추출은 관대하게 처리한다 (누락 필드 → 0).

use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::error::CoreError;
use crate::models::game_state::{Age, GameState, Resource, ResourceAmount};

/// 파서 에러: 항상 원본 응답 텍스트를 보존한다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// JSON 객체로 디코딩 불가
    #[error("JSON 디코딩 실패: {reason}")]
    Malformed { raw: String, reason: String },

    /// 숫자 필드 변환 실패
    #[error("필드 값 오류 ({field}): {value:?}")]
    InvalidField {
        field: String,
        value: String,
        raw: String,
    },
}

impl ParseError {
    /// 원본 응답 텍스트
    pub fn raw(&self) -> &str {
        match self {
            ParseError::Malformed { raw, .. } | ParseError::InvalidField { raw, .. } => raw,
        }
    }
}

impl From<ParseError> for CoreError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Malformed { raw, reason } => CoreError::MalformedResponse { raw, reason },
            ParseError::InvalidField { field, value, .. } => {
                CoreError::InvalidFieldValue { field, value }
            }
        }
    }
}

// ============================================================
// 공개 API
// ============================================================

/// 자원 바 분석 응답 → 게임 상태
pub fn parse_game_state(text: &str) -> Result<GameState, ParseError> {
    let root = decode_object(text)?;
    let invalid = |field: &str, value: &Value| ParseError::InvalidField {
        field: field.to_string(),
        value: display_value(value),
        raw: text.to_string(),
    };

    let mut state = GameState::default();

    if let Some(Value::Object(resources)) = root.get("Resources") {
        for (key, value) in resources {
            let Some(resource) = Resource::from_key(key) else {
                continue;
            };
            let amount = match coerce_count(value) {
                Some(v) => ResourceAmount::Counted(v),
                None => ResourceAmount::Unreadable(display_value(value)),
            };
            state.resources.set(resource, amount);
        }
    }

    if let Some(Value::Object(allocation)) = root.get("Villagers_on_resource") {
        for (key, value) in allocation {
            let Some(resource) = Resource::from_key(key) else {
                continue;
            };
            let count = coerce_count(value)
                .ok_or_else(|| invalid(&format!("Villagers_on_resource.{key}"), value))?;
            state.villagers_on_resource.set(resource, count);
        }
    }

    let units = match root.get("Units") {
        Some(Value::Object(units)) => Some(units),
        _ => None,
    };

    if let Some(units) = units {
        if let Some(value) = units.get("number of total units") {
            state.total_units = coerce_count(value)
                .ok_or_else(|| invalid("Units.number of total units", value))?;
        }
        if let Some(value) = units.get("Current House limit") {
            state.house_limit = coerce_count(value)
                .ok_or_else(|| invalid("Units.Current House limit", value))?;
        }
    }

    match root.get("Villagers") {
        Some(value) => {
            state.villagers = coerce_count(value).ok_or_else(|| invalid("Villagers", value))?;
        }
        None => {
            if let Some(value) = units.and_then(|u| u.get("number of villagers")) {
                state.villagers = coerce_count(value)
                    .ok_or_else(|| invalid("Units.number of villagers", value))?;
            }
        }
    }

    if let Some(value) = root.get("Idle Villagers") {
        state.idle_villagers =
            coerce_count(value).ok_or_else(|| invalid("Idle Villagers", value))?;
    }

    state.age = root
        .get("Current_age")
        .and_then(Value::as_str)
        .and_then(Age::parse);

    if let Some(value) = root.get("Time") {
        state.elapsed = match value.as_str().and_then(parse_match_time) {
            Some(elapsed) => elapsed,
            None => {
                warn!(time = %display_value(value), "경기 시간 파싱 실패, 0으로 처리");
                Duration::ZERO
            }
        };
    }

    Ok(state)
}

/// 문명 패널 분석 응답 → (플레이어, 문명) 목록 (응답 순서 유지)
pub fn parse_civ_assignments(text: &str) -> Result<Vec<(String, String)>, ParseError> {
    let root = decode_object(text)?;
    let mut assignments = Vec::with_capacity(root.len());

    for (player, value) in root {
        let civ = value.as_str().ok_or_else(|| ParseError::InvalidField {
            field: player.clone(),
            value: display_value(&value),
            raw: text.to_string(),
        })?;
        let civ = civ.trim();
        if !civ.is_empty() {
            assignments.push((player, civ.to_string()));
        }
    }

    Ok(assignments)
}

// ============================================================
// 내부 헬퍼
// ============================================================

/// 코드 펜스 제거 후 JSON 객체로 엄격 디코딩
fn decode_object(text: &str) -> Result<Map<String, Value>, ParseError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(ParseError::Malformed {
            raw: text.to_string(),
            reason: "빈 응답".to_string(),
        });
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ParseError::Malformed {
            raw: text.to_string(),
            reason: format!("JSON 객체가 아님: {}", json_kind(&other)),
        }),
        Err(e) => Err(ParseError::Malformed {
            raw: text.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// ```json ... ``` 감싸기 제거
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // 언어 태그 줄 건너뛰기
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// 숫자 또는 숫자 문자열 → u32. 빈 문자열/null은 0.
fn coerce_count(value: &Value) -> Option<u32> {
    match value {
        Value::Null => Some(0),
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v).ok();
            }
            let f = n.as_f64()?;
            (f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX)).then_some(f as u32)
        }
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                return Some(0);
            }
            cleaned.parse::<u32>().ok()
        }
        _ => None,
    }
}

/// "HH:MM:SS" 또는 "MM:SS"
fn parse_match_time(text: &str) -> Option<Duration> {
    let parts: Vec<u64> = text
        .trim()
        .split(':')
        .map(|p| p.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    let secs = match parts.as_slice() {
        [h, m, s] if *m < 60 && *s < 60 => h * 3600 + m * 60 + s,
        [m, s] if *s < 60 => m * 60 + s,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SAMPLE: &str = r#"{
        "Resources": {"Wood": "200", "Food": "200", "Gold": "100", "Stone": "200"},
        "Villagers_on_resource": {"Wood": "1", "Food": "1", "Gold": "0", "Stone": "0"},
        "Villagers": "3",
        "Units": {"number of total units": "4", "Current House limit": "5"},
        "Idle Villagers": "2",
        "Current_age": "Imperial Age",
        "Time": "00:22:44"
    }"#;

    #[test]
    fn parses_documented_example() {
        let state = parse_game_state(SAMPLE).unwrap();
        assert_eq!(state.resources.amount(Resource::Wood), 200);
        assert_eq!(state.resources.amount(Resource::Gold), 100);
        assert_eq!(state.villagers_on_resource.get(Resource::Food), 1);
        assert_eq!(state.villagers, 3);
        assert_eq!(state.total_units, 4);
        assert_eq!(state.house_limit, 5);
        assert_eq!(state.idle_villagers, 2);
        assert_eq!(state.age, Some(Age::Imperial));
        assert_eq!(state.elapsed, Duration::from_secs(22 * 60 + 44));
    }

    #[test]
    fn missing_idle_field_is_zero() {
        let state = parse_game_state(r#"{"Resources": {"Wood": 5}}"#).unwrap();
        assert_eq!(state.idle_villagers, 0);
        assert_eq!(state.house_limit, 0);
        assert_eq!(state.age, None);
    }

    #[test]
    fn malformed_text_keeps_raw_payload() {
        let raw = "Error: Ollama not available or model failed to load.";
        let err = parse_game_state(raw).unwrap_err();
        assert_matches!(&err, ParseError::Malformed { .. });
        assert_eq!(err.raw(), raw);
    }

    #[test]
    fn non_object_json_is_malformed() {
        assert_matches!(
            parse_game_state("[1, 2, 3]"),
            Err(ParseError::Malformed { .. })
        );
        assert_matches!(parse_game_state("   "), Err(ParseError::Malformed { .. }));
    }

    #[test]
    fn code_fence_is_stripped() {
        let fenced = "```json\n{\"Idle Villagers\": \"4\"}\n```";
        assert_eq!(parse_game_state(fenced).unwrap().idle_villagers, 4);
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let state = parse_game_state(
            r#"{"Resources": {"Stone": "1,250"}, "Villagers": " 87 ", "Idle Villagers": ""}"#,
        )
        .unwrap();
        assert_eq!(state.resources.amount(Resource::Stone), 1250);
        assert_eq!(state.villagers, 87);
        assert_eq!(state.idle_villagers, 0);
    }

    #[test]
    fn invalid_numeric_field_is_reported() {
        let err = parse_game_state(r#"{"Units": {"Current House limit": "many"}}"#).unwrap_err();
        assert_matches!(
            err,
            ParseError::InvalidField { ref field, ref value, .. }
                if field == "Units.Current House limit" && value == "many"
        );
    }

    #[test]
    fn unreadable_resource_is_kept() {
        let state = parse_game_state(r#"{"Resources": {"Gold": "n/a", "Wood": 10}}"#).unwrap();
        assert_eq!(
            state.resources.reading(Resource::Gold),
            Some(&ResourceAmount::Unreadable("n/a".into()))
        );
        assert_eq!(state.resources.amount(Resource::Wood), 10);
    }

    #[test]
    fn villager_count_falls_back_to_units() {
        let state =
            parse_game_state(r#"{"Units": {"number of villagers": "42"}}"#).unwrap();
        assert_eq!(state.villagers, 42);
    }

    #[test]
    fn bad_time_becomes_zero() {
        let state = parse_game_state(r#"{"Time": "soon"}"#).unwrap();
        assert_eq!(state.elapsed, Duration::ZERO);
        let state = parse_game_state(r#"{"Time": "12:05"}"#).unwrap();
        assert_eq!(state.elapsed, Duration::from_secs(725));
    }

    #[test]
    fn resource_order_follows_payload() {
        let state =
            parse_game_state(r#"{"Resources": {"Stone": 1, "Wood": 2, "Gold": 3}}"#).unwrap();
        let order: Vec<_> = state.resources.iter().map(|(r, _)| r).collect();
        assert_eq!(order, vec![Resource::Stone, Resource::Wood, Resource::Gold]);
    }

    #[test]
    fn civ_assignments_in_order() {
        let assignments =
            parse_civ_assignments(r#"{"TheViper": "Mongols", "Hera": "Britons", "x": ""}"#)
                .unwrap();
        assert_eq!(
            assignments,
            vec![
                ("TheViper".to_string(), "Mongols".to_string()),
                ("Hera".to_string(), "Britons".to_string()),
            ]
        );
    }

    #[test]
    fn civ_assignment_requires_strings() {
        assert_matches!(
            parse_civ_assignments(r#"{"TheViper": 3}"#),
            Err(ParseError::InvalidField { .. })
        );
    }

    #[test]
    fn converts_into_core_error() {
        let err: CoreError = parse_game_state("nope").unwrap_err().into();
        assert_matches!(err, CoreError::MalformedResponse { ref raw, .. } if raw == "nope");
    }
}
