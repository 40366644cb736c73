//! # wololo-app
//!
//! WOLOLO 오버레이 바이너리 진입점.
//! CLI 파싱, 설정 로드, DI 와이어링, 알림 루프 라이프사이클.

mod activity;
mod civ_counters;
mod lifecycle;
mod wiring;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wololo_alerts::audio::create_audio_player;
use wololo_alerts::dispatcher::AlertDispatcher;
use wololo_alerts::flash::ChannelFlashPresenter;
use wololo_alerts::pipeline::AlertPipeline;
use wololo_alerts::polling::AlertLoop;
use wololo_alerts::rules::{CooldownState, RuleEvaluator, RuleThresholds};
use wololo_alerts::settings::AlertToggles;
use wololo_automation::input_driver::create_platform_input_driver;
use wololo_automation::macros::{GameMacro, MacroRunner};
use wololo_core::config::AppConfig;
use wololo_core::config_manager::ConfigManager;
use wololo_core::models::counter::CounterDataset;
use wololo_core::parser::parse_game_state;
use wololo_core::ports::alert_output::AudioPlayer;
use wololo_core::prompts::RESOURCE_CHECK_PROMPT;

use crate::activity::ActivityCheck;
use crate::civ_counters::CivCounterService;
use crate::lifecycle::{ShutdownController, StopReason};

/// 종료 전 텔레메트리 전송 대기 한도
const TELEMETRY_FLUSH_TIMEOUT: Duration = Duration::from_secs(3);

/// WOLOLO: Age of Empires II 실시간 경고 오버레이
#[derive(Parser, Debug)]
#[command(name = "wololo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 알림 루프 실행 (Ctrl+C로 종료)
    Run,
    /// 상대 문명 카운터 한 번 분석
    Counters,
    /// 저장된 자원 바 이미지 분석 (출력 없이 평가만)
    Analyze {
        /// 자원 바 스크린샷 경로
        image: PathBuf,
    },
    /// 비전 백엔드 연결/API 키 확인
    Check,
    /// 생산 매크로 한 번 실행
    Macro {
        #[arg(value_enum)]
        kind: MacroKind,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MacroKind {
    /// 모든 마을회관에서 주민 생산
    Villager,
    /// 모든 성에서 고유 유닛 생산
    Castle,
}

impl From<MacroKind> for GameMacro {
    fn from(kind: MacroKind) -> Self {
        match kind {
            MacroKind::Villager => GameMacro::TrainVillager,
            MacroKind::Castle => GameMacro::TrainUniqueUnit,
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let manager = match path {
        Some(path) => ConfigManager::with_path(path)?,
        None => ConfigManager::new()?,
    };
    info!(path = %manager.config_path().display(), "설정 로드");
    let mut config = manager.get();
    config.apply_env_overrides();
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = [
        "wololo",
        "wololo_app",
        "wololo_core",
        "wololo_vision",
        "wololo_network",
        "wololo_automation",
        "wololo_alerts",
    ]
    .iter()
    .map(|krate| format!("{krate}={}", args.log_level))
    .collect::<Vec<_>>()
    .join(",");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    let config = load_config(args.config)?;

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run_alerts(config).await,
        Command::Counters => show_counters(config).await,
        Command::Analyze { image } => analyze_image(config, image).await,
        Command::Check => check_backend(config).await,
        Command::Macro { kind } => run_macro(config, kind.into()).await,
    }
}

// ============================================================
// 명령 처리
// ============================================================

async fn run_alerts(config: AppConfig) -> Result<()> {
    info!("WOLOLO 알림 루프 준비");

    let extractor = wiring::build_extractor(&config.extraction)?;
    let capturer = wiring::build_capturer(&config.capture);
    let telemetry = wiring::build_telemetry(&config).await;

    let audio: Arc<dyn AudioPlayer> = Arc::from(create_audio_player(&config.alerts.audio_dir));
    let (flash, mut flash_rx) = ChannelFlashPresenter::channel();
    let dispatcher = AlertDispatcher::new(audio, Arc::new(flash))
        .with_pacing(config.alerts.dispatch_pacing())
        .with_volume(config.alerts.audio_volume);

    let thresholds = RuleThresholds {
        low_villager_interval: config.alerts.low_villager_interval(),
        ..RuleThresholds::default()
    };
    let toggles = Arc::new(AlertToggles::from_config(&config.alerts));
    let pipeline = AlertPipeline::new(capturer, extractor, dispatcher, toggles)
        .with_thresholds(thresholds)
        .with_telemetry(telemetry.clone());
    let mut alert_loop = AlertLoop::new(pipeline, config.alerts.poll_interval());

    let shutdown_controller = ShutdownController::new();

    // 콘솔 호스트: 오버레이 창 대신 플래시를 출력
    let mut shutdown = shutdown_controller.subscribe();
    let host = tokio::spawn(async move {
        loop {
            tokio::select! {
                flash = flash_rx.recv() => match flash {
                    Some(flash) => {
                        let (r, g, b) = flash.color.rgb();
                        println!(
                            "\x1b[38;2;{r};{g};{b}m■\x1b[0m {} ({:?})",
                            flash.text, flash.duration
                        );
                    }
                    None => break,
                },
                _ = shutdown.changed() => break,
            }
        }
    });

    alert_loop.start()?;
    telemetry.record_action("start_resource_alerts", "User started resource alerts");

    let activity_check = ActivityCheck::from_config(&config.alerts);
    let mut answers = activity::stdin_lines();
    let reason = shutdown_controller.wait(activity_check, &mut answers).await;

    alert_loop.stop().await;
    match reason {
        StopReason::Signal => {
            telemetry.record_action("stop_resource_alerts", "User stopped resource alerts")
        }
        StopReason::Inactive => {
            println!("No activity confirmed, resource alerts stopped.");
            telemetry.record_action(
                "stop_resource_alerts",
                "Resource alerts stopped after unanswered activity check",
            )
        }
    }
    if let Err(e) = host.await {
        warn!("플래시 호스트 태스크 비정상 종료: {e}");
    }
    telemetry.flush(TELEMETRY_FLUSH_TIMEOUT).await;
    info!("WOLOLO 종료");
    Ok(())
}

async fn show_counters(config: AppConfig) -> Result<()> {
    let dataset = CounterDataset::load(&config.counters.dataset_path)?;
    let telemetry = wiring::build_telemetry(&config).await;
    let service = CivCounterService::new(
        wiring::build_capturer(&config.capture),
        wiring::build_extractor(&config.extraction)?,
        dataset,
        &config.player.username,
        &config.player.teammates,
    );

    telemetry.record_action("show_civs_counters", "User requested civilization counters");
    let result = service.analyze().await;
    telemetry.flush(TELEMETRY_FLUSH_TIMEOUT).await;
    println!("{}", result?);
    Ok(())
}

async fn analyze_image(config: AppConfig, image: PathBuf) -> Result<()> {
    if !image.exists() {
        return Err(anyhow!("이미지 파일 없음: {}", image.display()));
    }
    let extractor = wiring::build_extractor(&config.extraction)?;
    let text = extractor.extract(&image, RESOURCE_CHECK_PROMPT).await?;
    let state = parse_game_state(&text).with_context(|| format!("응답 파싱 실패: {text}"))?;

    println!("{}", serde_json::to_string_pretty(&state)?);

    let evaluator = RuleEvaluator::new(RuleThresholds {
        low_villager_interval: config.alerts.low_villager_interval(),
        ..RuleThresholds::default()
    });
    let alerts = evaluator.evaluate(&state, &mut CooldownState::new(), Instant::now());
    if alerts.is_empty() {
        println!("알림 없음");
    }
    for alert in alerts {
        println!("{} → {}", alert.kind, alert.flash.text);
    }
    Ok(())
}

async fn check_backend(config: AppConfig) -> Result<()> {
    let backend = wiring::build_backend(&config.extraction)?;
    backend
        .verify()
        .await
        .with_context(|| format!("{} 백엔드 확인 실패", backend.name()))?;
    println!("{} 백엔드 정상", backend.name());
    Ok(())
}

async fn run_macro(config: AppConfig, game_macro: GameMacro) -> Result<()> {
    let driver = Arc::from(create_platform_input_driver());
    let runner = MacroRunner::new(driver, &config.automation);
    if runner.run(game_macro).await? {
        info!(?game_macro, "매크로 실행");
        let telemetry = wiring::build_telemetry(&config).await;
        telemetry.record_action(
            game_macro.action_type(),
            &format!("User triggered {game_macro:?}"),
        );
        telemetry.flush(TELEMETRY_FLUSH_TIMEOUT).await;
    } else {
        println!("{game_macro:?} 매크로가 비활성화되어 있습니다");
    }
    Ok(())
}
