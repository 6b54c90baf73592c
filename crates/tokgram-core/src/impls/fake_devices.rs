//! FakeMediaDevices - デバイス無しで動くカメラ/マイク実装
//!
//! # 学習ポイント
//!
//! ## 1. トラックの生死を Arc<AtomicBool> で共有する
//! 各トラックの live フラグはデバイス側にも登録される。ストリームを
//! drop した後でも `live_track_count()` で「カメラを握ったままの
//! トラックが残っていないか」をデバイス視点で検証できる。
//!
//! ## 2. 拒否モード
//! `denying()` で作ると getUserMedia 相当が常に
//! [`CaptureError::PermissionDenied`] を返す。許可ダイアログで
//! 「ブロック」を選んだユーザーを再現するため。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::media_devices::{
    CaptureConstraints, CaptureError, CaptureStream, CaptureTrack, MediaDevices, TrackKind,
};

struct FakeTrack {
    kind: TrackKind,
    live: Arc<AtomicBool>,
}

impl CaptureTrack for FakeTrack {
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

/// In-memory MediaDevices double for tests and demos.
pub struct FakeMediaDevices {
    deny: AtomicBool,
    granted: Mutex<Vec<Arc<AtomicBool>>>,
}

impl FakeMediaDevices {
    /// Device that grants every request.
    pub fn new() -> Self {
        Self {
            deny: AtomicBool::new(false),
            granted: Mutex::new(Vec::new()),
        }
    }

    /// Device that denies every request.
    pub fn denying() -> Self {
        let devices = Self::new();
        devices.deny.store(true, Ordering::SeqCst);
        devices
    }

    pub fn set_deny(&self, deny: bool) {
        self.deny.store(deny, Ordering::SeqCst);
    }

    /// Tracks handed out so far that are still live, across all streams.
    pub fn live_track_count(&self) -> usize {
        self.granted
            .lock()
            .map(|flags| flags.iter().filter(|f| f.load(Ordering::SeqCst)).count())
            .unwrap_or(0)
    }

    fn grant(&self, kind: TrackKind) -> Box<dyn CaptureTrack> {
        let live = Arc::new(AtomicBool::new(true));
        if let Ok(mut granted) = self.granted.lock() {
            granted.push(live.clone());
        }
        Box::new(FakeTrack { kind, live })
    }
}

impl Default for FakeMediaDevices {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaDevices for FakeMediaDevices {
    async fn get_user_media(
        &self,
        constraints: CaptureConstraints,
    ) -> Result<CaptureStream, CaptureError> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(CaptureError::PermissionDenied);
        }

        let mut tracks = Vec::new();
        if constraints.audio {
            tracks.push(self.grant(TrackKind::Audio));
        }
        if constraints.video {
            tracks.push(self.grant(TrackKind::Video));
        }
        Ok(CaptureStream::new(tracks))
    }
}
