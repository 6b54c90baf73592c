//! Live 配信セッションの状態機械。
//!
//! # 設計原則
//!
//! ## 1. フェーズは一方向に遷移する
//! `Idle → Requesting → Streaming ⇄ Broadcasting`、離脱でどこからでも
//! `Idle` に戻る。デバイス取得が拒否されたら alert を出して `Idle` に
//! 留まる(Requesting で固まらない)。
//!
//! ## 2. キャプチャはスコープ付きリソース
//! [`CaptureStream`] はセッションが所有する。`leave()` が明示的に全
//! トラックを停止するが、呼び忘れてもセッションごと drop すれば
//! ストリームの Drop が停止する。「leave を通らない終了パス」でも
//! カメラ/マイクを握りっぱなしにしない。

use std::sync::Arc;

use crate::ports::media_devices::{
    CaptureConstraints, CaptureError, CaptureStream, MediaDevices,
};
use crate::ports::notifier::Notifier;

/// Live モードの現在フェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivePhase {
    /// Live に入っていない
    Idle,
    /// デバイス取得の許可待ち
    Requesting,
    /// プレビュー中(まだ配信していない)
    Streaming,
    /// 配信中
    Broadcasting,
}

/// One Live-mode session: owns the capture stream for its lifetime.
pub struct LiveSession {
    devices: Arc<dyn MediaDevices>,
    notifier: Arc<dyn Notifier>,
    phase: LivePhase,
    stream: Option<CaptureStream>,
}

impl LiveSession {
    pub fn new(devices: Arc<dyn MediaDevices>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            devices,
            notifier,
            phase: LivePhase::Idle,
            stream: None,
        }
    }

    pub fn phase(&self) -> LivePhase {
        self.phase
    }

    /// Tracks still holding the camera/microphone.
    pub fn live_track_count(&self) -> usize {
        self.stream
            .as_ref()
            .map(|s| s.live_track_count())
            .unwrap_or(0)
    }

    /// Enter Live mode: request camera + microphone and start the preview.
    ///
    /// Denial shows an alert and leaves the session in `Idle`. Entering
    /// while already active is a no-op.
    pub async fn enter(&mut self) -> Result<(), CaptureError> {
        if self.phase != LivePhase::Idle {
            return Ok(());
        }

        self.phase = LivePhase::Requesting;
        match self
            .devices
            .get_user_media(CaptureConstraints::audio_video())
            .await
        {
            Ok(stream) => {
                tracing::info!(tracks = stream.tracks().len(), "live preview started");
                self.stream = Some(stream);
                self.phase = LivePhase::Streaming;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "live capture denied");
                self.notifier.alert(&err.to_string());
                self.phase = LivePhase::Idle;
                Err(err)
            }
        }
    }

    /// Flip between preview and broadcast. Without a stream this does
    /// nothing. Returns the phase after the flip.
    pub fn toggle_broadcast(&mut self) -> LivePhase {
        self.phase = match self.phase {
            LivePhase::Streaming => LivePhase::Broadcasting,
            LivePhase::Broadcasting => LivePhase::Streaming,
            other => other,
        };
        self.phase
    }

    /// Leave Live mode from any phase: stop every track, drop the stream,
    /// return to `Idle`.
    pub fn leave(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.stop_all();
        }
        if self.phase != LivePhase::Idle {
            tracing::info!("live session ended");
        }
        self.phase = LivePhase::Idle;
    }
}
