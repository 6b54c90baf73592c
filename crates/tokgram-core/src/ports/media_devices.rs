//! MediaDevices port - カメラ/マイク取得の抽象化
//!
//! Live モードはここから取得した [`CaptureStream`] を preview に束縛します。
//! ストリームは revocable（各トラックは stop できる）で、Live 離脱時は
//! 必ず全トラックを停止してから破棄します。
//!
//! # テスト容易性
//! - trait によりデバイス取得を差し替え可能
//! - テスト・デモでは `impls::FakeMediaDevices` を使用

use async_trait::async_trait;
use thiserror::Error;

/// CaptureError はデバイス取得の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// ユーザーがカメラ/マイクのアクセスを拒否した
    #[error("Could not access camera. Please check permissions.")]
    PermissionDenied,

    /// デバイスが存在しない・使用中など
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
}

/// 取得するトラックの指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub audio: bool,
    pub video: bool,
}

impl CaptureConstraints {
    /// Live モードが要求する audio+video の組
    pub fn audio_video() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

/// トラックの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// CaptureTrack は 1 本の revocable なトラック
///
/// stop は冪等（二重 stop してもエラーにしない）。
pub trait CaptureTrack: Send + Sync {
    fn kind(&self) -> TrackKind;

    /// まだ配信中か
    fn is_live(&self) -> bool;

    /// トラックを停止（デバイスアクセスを手放す）
    fn stop(&self);
}

/// CaptureStream はトラックの束
///
/// Live 離脱時は `stop_all` を必ず呼ぶこと。呼び忘れても Drop が
/// 停止する（カメラ/マイクを握りっぱなしにしない）。
pub struct CaptureStream {
    tracks: Vec<Box<dyn CaptureTrack>>,
}

impl CaptureStream {
    pub fn new(tracks: Vec<Box<dyn CaptureTrack>>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Box<dyn CaptureTrack>] {
        &self.tracks
    }

    /// 全トラックを停止
    pub fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }

    /// 配信中のトラック数
    pub fn live_track_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_live()).count()
    }
}

impl std::fmt::Debug for CaptureStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureStream")
            .field("track_count", &self.tracks.len())
            .finish()
    }
}

impl Drop for CaptureStream {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// MediaDevices はホストのデバイス取得 API
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// 指定したトラック構成でストリームを取得
    ///
    /// 拒否されたら `CaptureError::PermissionDenied` を返す。
    async fn get_user_media(
        &self,
        constraints: CaptureConstraints,
    ) -> Result<CaptureStream, CaptureError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct TestTrack {
        kind: TrackKind,
        live: Arc<AtomicBool>,
    }

    impl CaptureTrack for TestTrack {
        fn kind(&self) -> TrackKind {
            self.kind
        }

        fn is_live(&self) -> bool {
            self.live.load(Ordering::SeqCst)
        }

        fn stop(&self) {
            self.live.store(false, Ordering::SeqCst);
        }
    }

    fn stream_with_flags() -> (CaptureStream, Arc<AtomicBool>, Arc<AtomicBool>) {
        let audio = Arc::new(AtomicBool::new(true));
        let video = Arc::new(AtomicBool::new(true));
        let stream = CaptureStream::new(vec![
            Box::new(TestTrack {
                kind: TrackKind::Audio,
                live: audio.clone(),
            }),
            Box::new(TestTrack {
                kind: TrackKind::Video,
                live: video.clone(),
            }),
        ]);
        (stream, audio, video)
    }

    #[test]
    fn stop_all_stops_every_track() {
        let (stream, audio, video) = stream_with_flags();
        assert_eq!(stream.live_track_count(), 2);

        stream.stop_all();
        assert_eq!(stream.live_track_count(), 0);
        assert!(!audio.load(Ordering::SeqCst));
        assert!(!video.load(Ordering::SeqCst));
    }

    #[test]
    fn drop_stops_tracks_even_without_explicit_teardown() {
        let (stream, audio, video) = stream_with_flags();
        drop(stream);
        assert!(!audio.load(Ordering::SeqCst));
        assert!(!video.load(Ordering::SeqCst));
    }

    #[test]
    fn stop_is_idempotent() {
        let (stream, _, _) = stream_with_flags();
        stream.stop_all();
        stream.stop_all();
        assert_eq!(stream.live_track_count(), 0);
    }
}
