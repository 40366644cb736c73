//! rodio 기반 경고음 재생.
//!
//! `OutputStream`은 `Send`가 아니므로 전용 스레드가 스트림과 `Sink`를
//! 소유한다. 디코딩은 호출 측에서 끝내고 디코더만 채널로 넘긴다.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::{debug, info, warn};

use rodio::{Decoder, Source};
use wololo_core::error::CoreError;
use wololo_core::models::alert::AudioCue;
use wololo_core::ports::alert_output::AudioPlayer;

type CueSource = Decoder<BufReader<File>>;

struct PlayRequest {
    source: CueSource,
    volume: f32,
}

/// 큐 파일을 열고 디코딩
pub fn load_cue(audio_dir: &Path, cue: &AudioCue) -> Result<CueSource, CoreError> {
    let path = audio_dir.join(cue.file_name());
    let file = File::open(&path)
        .map_err(|e| CoreError::Dispatch(format!("경고음 파일 열기 실패 ({}): {e}", path.display())))?;
    Decoder::new(BufReader::new(file))
        .map_err(|e| CoreError::Dispatch(format!("경고음 디코딩 실패 ({}): {e}", path.display())))
}

/// rodio 재생기
pub struct RodioAudioPlayer {
    audio_dir: PathBuf,
    tx: mpsc::Sender<PlayRequest>,
}

impl RodioAudioPlayer {
    /// 재생 스레드를 띄우고 출력 장치가 열릴 때까지 기다린다.
    pub fn new(audio_dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let (tx, rx) = mpsc::channel::<PlayRequest>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), String>>(1);

        std::thread::Builder::new()
            .name("wololo-audio".into())
            .spawn(move || playback_loop(rx, ready_tx))
            .map_err(|e| CoreError::Dispatch(format!("오디오 스레드 생성 실패: {e}")))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(CoreError::Dispatch(format!("오디오 장치 열기 실패: {e}"))),
            Err(_) => return Err(CoreError::Dispatch("오디오 스레드가 종료됨".into())),
        }

        let audio_dir = audio_dir.into();
        info!(dir = %audio_dir.display(), "오디오 출력 준비 완료");
        Ok(Self { audio_dir, tx })
    }
}

fn playback_loop(rx: mpsc::Receiver<PlayRequest>, ready: mpsc::SyncSender<Result<(), String>>) {
    let stream = match rodio::OutputStreamBuilder::open_default_stream() {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    let sink = rodio::Sink::connect_new(stream.mixer());
    let _ = ready.send(Ok(()));

    for request in rx {
        sink.append(request.source.amplify(request.volume));
    }
    debug!("오디오 채널 종료, 재생 스레드 정리");
}

impl AudioPlayer for RodioAudioPlayer {
    fn play(&self, cue: &AudioCue, volume: f32) -> Result<(), CoreError> {
        let source = load_cue(&self.audio_dir, cue)?;
        self.tx
            .send(PlayRequest {
                source,
                volume: volume.clamp(0.0, 1.0),
            })
            .map_err(|_| CoreError::Dispatch("오디오 재생 스레드 종료됨".into()))?;
        debug!(cue = %cue, volume, "경고음 재생 요청");
        Ok(())
    }
}

/// 출력 장치가 없을 때 쓰는 재생기: 로그만 남긴다.
pub struct SilentAudioPlayer;

impl AudioPlayer for SilentAudioPlayer {
    fn play(&self, cue: &AudioCue, volume: f32) -> Result<(), CoreError> {
        debug!(cue = %cue, volume, "[Silent] 경고음 생략");
        Ok(())
    }
}

/// 오디오 재생기 생성. 장치를 열 수 없으면 무음 재생기로 폴백.
pub fn create_audio_player(audio_dir: impl Into<PathBuf>) -> Box<dyn AudioPlayer> {
    match RodioAudioPlayer::new(audio_dir) {
        Ok(player) => Box::new(player),
        Err(e) => {
            warn!("{e}, 무음 모드로 진행");
            Box::new(SilentAudioPlayer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cue_file_is_dispatch_error() {
        let dir = tempfile::tempdir().unwrap();
        let Err(err) = load_cue(dir.path(), &AudioCue::new("maison.mp3")) else {
            panic!("missing file must fail");
        };
        assert!(matches!(err, CoreError::Dispatch(_)));
        assert!(err.to_string().contains("maison.mp3"));
    }

    #[test]
    fn undecodable_cue_is_dispatch_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.wav"), b"not really audio").unwrap();
        let Err(err) = load_cue(dir.path(), &AudioCue::new("broken.wav")) else {
            panic!("garbage bytes must not decode");
        };
        assert!(matches!(err, CoreError::Dispatch(_)));
    }

    #[test]
    fn silent_player_accepts_everything() {
        assert!(SilentAudioPlayer
            .play(&AudioCue::new(AudioCue::IDLE_VILLAGERS), 0.35)
            .is_ok());
    }
}
