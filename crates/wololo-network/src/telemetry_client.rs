//! 텔레메트리 HTTP 클라이언트.
//!
//! `TelemetrySink` 포트 구현. 세션 생성 후 액션을 fire-and-forget으로 전송한다.
//! 전송 실패는 로그만 남기고 파이프라인에 영향을 주지 않는다.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use wololo_core::error::CoreError;
use wololo_core::ports::telemetry::TelemetrySink;

/// 세션 생성 요청 본문
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub pc_name_description: String,
    pub username: String,
    pub teammates_username: String,
    pub app_version: String,
    #[serde(rename = "windows_version")]
    pub os_version: String,
}

impl SessionInfo {
    /// 현재 환경 기준 세션 정보
    pub fn collect(username: &str, teammates: &[String], app_version: &str) -> Self {
        let pc_name = std::env::var("USERNAME")
            .or_else(|_| std::env::var("USER"))
            .unwrap_or_else(|_| "Unknown".to_string());
        Self {
            pc_name_description: pc_name,
            username: username.to_string(),
            teammates_username: teammates.join(", "),
            app_version: app_version.to_string(),
            os_version: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }
}

#[derive(Deserialize)]
struct SessionCreated {
    id: Value,
}

#[derive(Serialize)]
struct ActionBody<'a> {
    session_id: &'a Value,
    action_type: &'a str,
    description: &'a str,
}

/// 텔레메트리 클라이언트
#[derive(Clone)]
pub struct HttpTelemetryClient {
    client: reqwest::Client,
    base_url: String,
    session_id: Arc<RwLock<Option<Value>>>,
    in_flight: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl HttpTelemetryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: Arc::new(RwLock::new(None)),
            in_flight: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// 사용자 세션 생성 (`POST /user_sessions/`)
    pub async fn create_session(&self, info: &SessionInfo) -> Result<String, CoreError> {
        let url = format!("{}/user_sessions/", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(info)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("세션 생성 요청 실패: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_else(|e| {
                warn!("응답 본문 읽기 실패: {e}");
                String::new()
            });
            return Err(CoreError::Network(format!("세션 생성 실패 ({status}): {text}")));
        }

        let created: SessionCreated = resp
            .json()
            .await
            .map_err(|e| CoreError::Network(format!("세션 응답 파싱 실패: {e}")))?;

        let id_text = match &created.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        *self.session_id.write() = Some(created.id);
        info!(session_id = %id_text, "텔레메트리 세션 생성");
        Ok(id_text)
    }

    /// 현재 세션 ID
    pub fn session_id(&self) -> Option<String> {
        self.session_id.read().as_ref().map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// 액션 전송 (`POST /actions/`): 세션이 없으면 생략
    pub async fn send_action(&self, action_type: &str, description: &str) -> Result<(), CoreError> {
        let Some(session_id) = self.session_id.read().clone() else {
            debug!(action_type, "활성 세션 없음, 액션 생략");
            return Ok(());
        };

        let url = format!("{}/actions/", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&ActionBody {
                session_id: &session_id,
                action_type,
                description,
            })
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("액션 전송 실패: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Network(format!("액션 전송 실패 ({status})")));
        }
        debug!(action_type, "액션 전송 완료");
        Ok(())
    }

    /// 서버 상태 확인 (`GET /` → 200)
    pub async fn check_server_status(&self) -> bool {
        match self.client.get(&self.base_url).send().await {
            Ok(resp) => resp.status() == reqwest::StatusCode::OK,
            Err(e) => {
                debug!("텔레메트리 서버 도달 불가: {e}");
                false
            }
        }
    }
}

#[async_trait]
impl TelemetrySink for HttpTelemetryClient {
    fn record_action(&self, action_type: &str, description: &str) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(action_type, "tokio 런타임 없음, 액션 생략");
            return;
        };

        let client = self.clone();
        let action_type = action_type.to_string();
        let description = description.to_string();
        let task = handle.spawn(async move {
            if let Err(e) = client.send_action(&action_type, &description).await {
                warn!(action_type = %action_type, "텔레메트리 전송 실패: {e}");
            }
        });

        let mut in_flight = self.in_flight.lock();
        in_flight.retain(|task| !task.is_finished());
        in_flight.push(task);
    }

    async fn flush(&self, timeout: Duration) {
        let pending = std::mem::take(&mut *self.in_flight.lock());
        if pending.is_empty() {
            return;
        }

        let count = pending.len();
        let wait = async move {
            for task in pending {
                if let Err(e) = task.await {
                    warn!("텔레메트리 전송 태스크 비정상 종료: {e}");
                }
            }
        };
        match tokio::time::timeout(timeout, wait).await {
            Ok(()) => debug!(count, "텔레메트리 전송 대기 완료"),
            Err(_) => warn!(count, "텔레메트리 전송 대기 시간 초과, 남은 액션 포기"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> SessionInfo {
        SessionInfo {
            pc_name_description: "pc".into(),
            username: "Vinchester".into(),
            teammates_username: "Hera".into(),
            app_version: "0.4.0".into(),
            os_version: "linux-x86_64".into(),
        }
    }

    #[test]
    fn session_info_uses_server_field_names() {
        let json = serde_json::to_value(info()).unwrap();
        assert_eq!(json["windows_version"], "linux-x86_64");
        assert_eq!(json["teammates_username"], "Hera");
    }

    #[tokio::test]
    async fn create_session_then_send_action() {
        let mut server = mockito::Server::new_async().await;
        let session_mock = server
            .mock("POST", "/user_sessions/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 42}"#)
            .create_async()
            .await;
        let action_mock = server
            .mock("POST", "/actions/")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "session_id": 42,
                "action_type": "house_limit_warning"
            })))
            .with_status(200)
            .create_async()
            .await;

        let client = HttpTelemetryClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let id = client.create_session(&info()).await.unwrap();
        assert_eq!(id, "42");
        assert_eq!(client.session_id().as_deref(), Some("42"));

        client
            .send_action("house_limit_warning", "180/180")
            .await
            .unwrap();

        session_mock.assert_async().await;
        action_mock.assert_async().await;
    }

    #[tokio::test]
    async fn flush_delivers_recorded_actions() {
        let mut server = mockito::Server::new_async().await;
        let _session = server
            .mock("POST", "/user_sessions/")
            .with_status(200)
            .with_body(r#"{"id": "s-1"}"#)
            .create_async()
            .await;
        let action_mock = server
            .mock("POST", "/actions/")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "session_id": "s-1",
                "action_type": "create_villager"
            })))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = HttpTelemetryClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        client.create_session(&info()).await.unwrap();

        client.record_action("create_villager", "User triggered TrainVillager");
        client.flush(Duration::from_secs(5)).await;

        action_mock.assert_async().await;
        assert!(client.in_flight.lock().is_empty());
    }

    #[tokio::test]
    async fn flush_without_pending_actions_returns() {
        let client = HttpTelemetryClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        client.flush(Duration::from_millis(10)).await;
    }

    #[tokio::test]
    async fn action_without_session_is_skipped() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/actions/")
            .expect(0)
            .create_async()
            .await;

        let client = HttpTelemetryClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        client.send_action("resource_check", "x").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_status_requires_200() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/").with_status(503).create_async().await;

        let client = HttpTelemetryClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        assert!(!client.check_server_status().await);
    }

    #[test]
    fn unreachable_server_is_down() {
        let client = HttpTelemetryClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(!tokio_test::block_on(client.check_server_status()));
    }

    #[test]
    fn record_action_without_runtime_does_not_panic() {
        let client = HttpTelemetryClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        client.record_action("resource_check", "no runtime");
    }
}
