//! 설정 파일 관리.
//!
//! 플랫폼별 설정 디렉토리(`directories::ProjectDirs`)에 JSON 파일로
//! 설정을 저장/로드한다.

use directories::ProjectDirs;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::CoreError;

/// 설정 파일 이름
const CONFIG_FILE_NAME: &str = "config.json";

/// 설정 관리자
///
/// 설정 파일의 로드/저장 및 런타임 설정 변경을 관리한다.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// 현재 설정 (스레드 안전)
    config: Arc<RwLock<AppConfig>>,
    /// 설정 파일 경로
    config_path: PathBuf,
}

impl ConfigManager {
    /// 기본 경로로 설정 관리자 생성
    pub fn new() -> Result<Self, CoreError> {
        Self::with_path(Self::default_config_path()?)
    }

    /// 지정된 경로로 설정 관리자 생성
    ///
    /// 설정 파일이 없으면 기본 설정을 생성하고 저장한다.
    pub fn with_path(config_path: PathBuf) -> Result<Self, CoreError> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    CoreError::Config(format!(
                        "설정 디렉토리 생성 실패: {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
                info!("설정 디렉토리 생성: {}", parent.display());
            }
        }

        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let default_config = AppConfig::default_config();
            Self::save_to_file(&config_path, &default_config)?;
            info!("기본 설정 파일 생성: {}", config_path.display());
            default_config
        };

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// 현재 설정 반환 (복제본)
    pub fn get(&self) -> AppConfig {
        self.config.read().clone()
    }

    /// 설정 업데이트 및 파일 저장
    pub fn update(&self, new_config: AppConfig) -> Result<(), CoreError> {
        Self::save_to_file(&self.config_path, &new_config)?;
        *self.config.write() = new_config;
        debug!("설정 저장 완료: {}", self.config_path.display());
        Ok(())
    }

    /// 특정 필드만 업데이트
    pub fn update_with<F>(&self, updater: F) -> Result<AppConfig, CoreError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.get();
        updater(&mut config);
        self.update(config.clone())?;
        Ok(config)
    }

    /// 설정 파일 경로
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 설정 다시 로드
    pub fn reload(&self) -> Result<(), CoreError> {
        let config = Self::load_from_file(&self.config_path)?;
        *self.config.write() = config;
        info!("설정 다시 로드 완료");
        Ok(())
    }

    /// 플랫폼별 기본 설정 파일 경로
    ///
    /// - macOS: `~/Library/Application Support/com.wololo.overlay/config.json`
    /// - Windows: `%APPDATA%\wololo\overlay\config\config.json`
    /// - Linux: `~/.config/overlay/config.json`
    pub fn default_config_path() -> Result<PathBuf, CoreError> {
        Ok(Self::project_dirs()?.config_dir().join(CONFIG_FILE_NAME))
    }

    /// 캡처 이미지 기본 저장 디렉토리
    pub fn default_capture_dir() -> Result<PathBuf, CoreError> {
        Ok(Self::project_dirs()?.cache_dir().join("captures"))
    }

    fn project_dirs() -> Result<ProjectDirs, CoreError> {
        ProjectDirs::from("com", "wololo", "overlay")
            .ok_or_else(|| CoreError::Config("홈 디렉토리를 찾을 수 없습니다".to_string()))
    }

    /// 파일에서 설정 로드
    fn load_from_file(path: &Path) -> Result<AppConfig, CoreError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("설정 파일 읽기 실패: {}: {}", path.display(), e))
        })?;

        let config: AppConfig = serde_json::from_str(&content).map_err(|e| {
            CoreError::Config(format!("설정 파일 파싱 실패: {}: {}", path.display(), e))
        })?;

        debug!("설정 파일 로드 완료: {}", path.display());
        Ok(config)
    }

    /// 파일에 설정 저장
    fn save_to_file(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
        let content = serde_json::to_string_pretty(config)
            .map_err(|e| CoreError::Config(format!("설정 직렬화 실패: {}", e)))?;

        fs::write(path, content).map_err(|e| {
            CoreError::Config(format!("설정 파일 저장 실패: {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}
