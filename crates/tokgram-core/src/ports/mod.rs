//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait はホスト環境（生成系 API、カメラ/マイク、ローカルストレージ、
//! ダイアログ）へのインターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - ストア（Content/Draft/Message）がアプリ内の source of truth
//! - ホストへの副作用はすべてポート越し（テストで差し替え可能）
//! - 対話的な前提条件（confirm, キー選択）もポートとして表現

pub mod clock;
pub mod id_generator;
pub mod local_store;
pub mod media_devices;
pub mod notifier;
pub mod provider;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::local_store::{FileLocalStore, LocalStore, MemoryLocalStore, StorageError};
pub use self::media_devices::{
    CaptureConstraints, CaptureError, CaptureStream, CaptureTrack, MediaDevices, TrackKind,
};
pub use self::notifier::{Notifier, RecordingNotifier};
pub use self::provider::{
    AlwaysSelectedKey, GenerativeProvider, KeySelector, VideoJobHandle, VideoJobStatus,
    VideoSubmission,
};
