//! 애플리케이션 설정 구조체.
//!
//! 플레이어 정보, 캡처, 비전 백엔드, 알림, 매크로, 텔레메트리, 카운터 데이터
//! 설정을 정의한다. `ConfigManager`가 JSON 파일로 로드/저장한다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 플레이어 정보
    #[serde(default)]
    pub player: PlayerConfig,
    /// 화면 캡처 설정
    #[serde(default)]
    pub capture: CaptureConfig,
    /// 비전 추출 설정
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// 알림 설정
    #[serde(default)]
    pub alerts: AlertConfig,
    /// 매크로 설정
    #[serde(default)]
    pub automation: AutomationConfig,
    /// 텔레메트리 설정
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// 카운터 데이터 설정
    #[serde(default)]
    pub counters: CounterConfig,
}

impl AppConfig {
    /// 기본 설정
    pub fn default_config() -> Self {
        Self::default()
    }

    /// 환경 변수 덮어쓰기 (`WOLOLO_GEMINI_API_KEY`)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("WOLOLO_GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                self.extraction.gemini.api_key = key.trim().to_string();
            }
        }
    }
}

// ============================================================
// 플레이어 설정
// ============================================================

/// 플레이어 정보: 문명 분석 시 본인/팀원 제외, 텔레메트리 세션에 사용
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// 게임 내 본인 이름
    #[serde(default)]
    pub username: String,
    /// 팀원 이름 목록
    #[serde(default)]
    pub teammates: Vec<String>,
}

// ============================================================
// 캡처 설정
// ============================================================

/// 화면 캡처 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// 캡처 저장 디렉토리 (None이면 플랫폼 캐시 디렉토리)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// JPEG 품질 (1-100)
    #[serde(default = "default_capture_quality")]
    pub jpeg_quality: u8,
}

fn default_capture_quality() -> u8 {
    90
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            jpeg_quality: default_capture_quality(),
        }
    }
}

// ============================================================
// 비전 추출 설정
// ============================================================

/// 비전 백엔드 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// 원격 Gemini API (API 키 필요)
    #[default]
    Gemini,
    /// 로컬 Ollama 서버
    Ollama,
}

/// 비전 추출 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// 사용할 백엔드
    #[serde(default)]
    pub backend: BackendKind,
    /// Gemini 설정
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Ollama 설정
    #[serde(default)]
    pub ollama: OllamaConfig,
    /// 최대 시도 횟수
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 재시도 간격 (밀리초)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// 업로드 이미지 최대 변 길이 (픽셀)
    #[serde(default = "default_max_image_dimension")]
    pub max_image_dimension: u32,
    /// 업로드 JPEG 품질
    #[serde(default = "default_upload_quality")]
    pub jpeg_quality: u8,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    2_000
}
fn default_max_image_dimension() -> u32 {
    1024
}
fn default_upload_quality() -> u8 {
    85
}

impl ExtractionConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            gemini: GeminiConfig::default(),
            ollama: OllamaConfig::default(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            max_image_dimension: default_max_image_dimension(),
            jpeg_quality: default_upload_quality(),
        }
    }
}

/// Gemini API 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API 엔드포인트
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,
    /// API 키 (메모리/설정 파일에만 유지)
    #[serde(default)]
    pub api_key: String,
    /// 모델 이름
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_request_timeout() -> u64 {
    30
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_gemini_endpoint(),
            api_key: String::new(),
            model: default_gemini_model(),
            timeout_secs: default_request_timeout(),
        }
    }
}

/// Ollama 로컬 서버 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// 루프백 주소
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// 비전 모델 이름
    #[serde(default = "default_ollama_model")]
    pub model: String,
    /// 요청 타임아웃 (초): 로컬 추론은 느리므로 넉넉하게
    #[serde(default = "default_ollama_timeout")]
    pub timeout_secs: u64,
}

fn default_ollama_url() -> String {
    "http://127.0.0.1:11434".to_string()
}
fn default_ollama_model() -> String {
    "llama3.2-vision".to_string()
}
fn default_ollama_timeout() -> u64 {
    120
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
            timeout_secs: default_ollama_timeout(),
        }
    }
}

// ============================================================
// 알림 설정
// ============================================================

/// 알림 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// 폴링 주기 (초)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// 주민 부족 경고 최소 간격 (초)
    #[serde(default = "default_low_villager_interval")]
    pub low_villager_interval_secs: u64,
    /// 알림 간 간격 (밀리초)
    #[serde(default = "default_pacing_ms")]
    pub dispatch_pacing_ms: u64,
    /// 경고음 활성화
    #[serde(default = "default_true")]
    pub audio_enabled: bool,
    /// 화면 플래시 활성화
    #[serde(default = "default_true")]
    pub flash_enabled: bool,
    /// 유휴 주민 경고음 활성화
    #[serde(default = "default_true")]
    pub idle_villager_audio_enabled: bool,
    /// 경고음 볼륨 (0.0-1.0)
    #[serde(default = "default_volume")]
    pub audio_volume: f32,
    /// 경고음 파일 디렉토리
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
    /// 활동 확인 주기 (초, 0이면 비활성): 자리를 비운 동안 백엔드 호출을 막는다
    #[serde(default = "default_activity_check")]
    pub activity_check_secs: u64,
    /// 활동 확인 응답 대기 시간 (초)
    #[serde(default = "default_activity_answer_timeout")]
    pub activity_answer_timeout_secs: u64,
}

fn default_poll_interval() -> u64 {
    15
}
fn default_low_villager_interval() -> u64 {
    50
}
fn default_pacing_ms() -> u64 {
    2_000
}
fn default_true() -> bool {
    true
}
fn default_volume() -> f32 {
    0.35
}
fn default_audio_dir() -> PathBuf {
    PathBuf::from("audio").join("warnings")
}
fn default_activity_check() -> u64 {
    2 * 60 * 60
}
fn default_activity_answer_timeout() -> u64 {
    60
}

impl AlertConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn low_villager_interval(&self) -> Duration {
        Duration::from_secs(self.low_villager_interval_secs)
    }

    pub fn dispatch_pacing(&self) -> Duration {
        Duration::from_millis(self.dispatch_pacing_ms)
    }

    /// 활동 확인 주기. 0이면 `None`.
    pub fn activity_check_interval(&self) -> Option<Duration> {
        (self.activity_check_secs > 0).then(|| Duration::from_secs(self.activity_check_secs))
    }

    pub fn activity_answer_timeout(&self) -> Duration {
        Duration::from_secs(self.activity_answer_timeout_secs)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            low_villager_interval_secs: default_low_villager_interval(),
            dispatch_pacing_ms: default_pacing_ms(),
            audio_enabled: true,
            flash_enabled: true,
            idle_villager_audio_enabled: true,
            audio_volume: default_volume(),
            audio_dir: default_audio_dir(),
            activity_check_secs: default_activity_check(),
            activity_answer_timeout_secs: default_activity_answer_timeout(),
        }
    }
}

// ============================================================
// 매크로 설정
// ============================================================

/// 키보드 매크로 설정: 단축키 등록은 호스트가 담당
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// 주민 생산 매크로 활성화
    #[serde(default = "default_true")]
    pub villager_macro_enabled: bool,
    /// 고유 유닛 생산 매크로 활성화
    #[serde(default = "default_true")]
    pub unique_unit_macro_enabled: bool,
    /// 주민 생산 단축키
    #[serde(default = "default_villager_hotkey")]
    pub villager_hotkey: String,
    /// 고유 유닛 생산 단축키
    #[serde(default = "default_unique_unit_hotkey")]
    pub unique_unit_hotkey: String,
    /// 문명 카운터 조회 단축키
    #[serde(default = "default_counters_hotkey")]
    pub counters_hotkey: String,
}

fn default_villager_hotkey() -> String {
    "1".to_string()
}
fn default_unique_unit_hotkey() -> String {
    "2".to_string()
}
fn default_counters_hotkey() -> String {
    "ctrl+.".to_string()
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            villager_macro_enabled: true,
            unique_unit_macro_enabled: true,
            villager_hotkey: default_villager_hotkey(),
            unique_unit_hotkey: default_unique_unit_hotkey(),
            counters_hotkey: default_counters_hotkey(),
        }
    }
}

// ============================================================
// 텔레메트리 설정
// ============================================================

/// 텔레메트리 설정: 기본 비활성
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,
    /// 텔레메트리 서버 주소
    #[serde(default = "default_telemetry_url")]
    pub base_url: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_telemetry_timeout")]
    pub timeout_secs: u64,
}

fn default_telemetry_url() -> String {
    "http://api.wolologpt.com".to_string()
}
fn default_telemetry_timeout() -> u64 {
    10
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_telemetry_url(),
            timeout_secs: default_telemetry_timeout(),
        }
    }
}

// ============================================================
// 카운터 데이터 설정
// ============================================================

/// 카운터 데이터셋 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterConfig {
    /// 카운터 JSON 파일 경로
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("counters_data").join("aoe2_counters.json")
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cadence() {
        let config = AppConfig::default_config();
        assert_eq!(config.alerts.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.alerts.low_villager_interval(), Duration::from_secs(50));
        assert_eq!(config.alerts.dispatch_pacing(), Duration::from_secs(2));
        assert_eq!(config.extraction.max_attempts, 3);
        assert_eq!(config.extraction.retry_delay(), Duration::from_secs(2));
        assert!((config.alerts.audio_volume - 0.35).abs() < f32::EPSILON);
        assert!(!config.telemetry.enabled);
        assert_eq!(
            config.alerts.activity_check_interval(),
            Some(Duration::from_secs(7200))
        );
    }

    #[test]
    fn zero_activity_check_disables_it() {
        let config: AppConfig =
            serde_json::from_str(r#"{"alerts": {"activity_check_secs": 0}}"#).unwrap();
        assert_eq!(config.alerts.activity_check_interval(), None);
        assert_eq!(
            config.alerts.activity_answer_timeout(),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"alerts": {"flash_enabled": false}}"#).unwrap();
        assert!(!config.alerts.flash_enabled);
        assert!(config.alerts.audio_enabled);
        assert_eq!(config.extraction.backend, BackendKind::Gemini);
        assert_eq!(config.automation.villager_hotkey, "1");
    }

    #[test]
    fn backend_kind_lowercase() {
        let config: ExtractionConfig = serde_json::from_str(r#"{"backend": "ollama"}"#).unwrap();
        assert_eq!(config.backend, BackendKind::Ollama);
        assert_eq!(config.ollama.base_url, "http://127.0.0.1:11434");
    }
}
