//! GenerativeProvider port - 生成系 API の抽象化
//!
//! プロバイダはワイヤに近い形で結果を返します（画像は配列、動画 job は
//! ハンドル + ステータス）。「payload が無ければ GenerationError」の判定や
//! ポーリング・フォールバック文字列の差し込みは [`crate::genmedia::GenerativeClient`]
//! の責務で、ここには置きません。

use async_trait::async_trait;
use std::fmt;

use crate::domain::errors::GenerationError;
use crate::domain::media::{AspectRatio, MediaPayload};

/// Opaque handle of a long-running video job.
///
/// The provider hands this back on submission; polls quote it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoJobHandle(String);

impl VideoJobHandle {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoJobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Status of a long-running video job.
///
/// `Done` carries the download URL when the provider produced a video;
/// a `Done` without a URL means the job finished empty-handed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoJobStatus {
    Pending,
    Done { download_url: Option<String> },
}

impl VideoJobStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}

/// Result of submitting a video job.
///
/// Submission itself reports a first status (the job may already be done),
/// so the submit call counts as one status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSubmission {
    pub handle: VideoJobHandle,
    pub status: VideoJobStatus,
}

/// GenerativeProvider は外部の生成系 API
///
/// # Design intent
/// - 画像系はレスポンスの画像列をそのまま返す（0 件でもエラーにしない）
/// - 動画系は submit / poll / fetch の 3 段階（poll-until-done パターン）
/// - テキスト系は生のテキストを返す（空文字もそのまま）
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Text-to-image. Returns every image the provider produced.
    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<MediaPayload>, GenerationError>;

    /// Image editing. Returns every inline image part of the response.
    async fn edit_image(
        &self,
        source: &MediaPayload,
        prompt: &str,
    ) -> Result<Vec<MediaPayload>, GenerationError>;

    /// Submit a text-to-video (source_image = None) or image-to-video job.
    async fn submit_video(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        source_image: Option<&MediaPayload>,
    ) -> Result<VideoSubmission, GenerationError>;

    /// One status check of a running job.
    async fn poll_video(
        &self,
        handle: &VideoJobHandle,
    ) -> Result<VideoJobStatus, GenerationError>;

    /// Materialize the finished video's bytes from its download URL.
    async fn fetch_video(&self, download_url: &str) -> Result<MediaPayload, GenerationError>;

    /// Video understanding. Returns the provider's raw text (may be empty).
    async fn analyze_video(
        &self,
        source: &MediaPayload,
        prompt: &str,
    ) -> Result<String, GenerationError>;

    /// Free-text Q&A. Returns the provider's raw text (may be empty).
    async fn ask(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// KeySelector はホスト側の API キー選択 UI
///
/// 動画系の操作はユーザーが明示的にキーを選んでいることが前提条件。
/// 選ばれていなければ選択ダイアログを開いてもらう。
#[async_trait]
pub trait KeySelector: Send + Sync {
    /// キーが選択済みか
    async fn has_selected_key(&self) -> bool;

    /// 選択ダイアログを開く。true = 選択された
    async fn open_select_key(&self) -> bool;
}

/// AlwaysSelectedKey はキー選択が不要なホスト用の実装
///
/// デモ・テストでは常に選択済みとして扱う。
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysSelectedKey;

#[async_trait]
impl KeySelector for AlwaysSelectedKey {
    async fn has_selected_key(&self) -> bool {
        true
    }

    async fn open_select_key(&self) -> bool {
        true
    }
}
