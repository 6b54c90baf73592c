//! Test doubles for the generation pipeline.
//!
//! StubProvider は外部 API を一切呼ばずに GenerativeProvider を演じる。
//! ステータスチェック回数・fetch 回数をカウントするので「何回ポーリング
//! したか」をテストで検証できる。

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::errors::GenerationError;
use crate::domain::media::{AspectRatio, MediaPayload};
use crate::ports::provider::{
    GenerativeProvider, KeySelector, VideoJobHandle, VideoJobStatus, VideoSubmission,
};

/// Scripted provider: answers are fixed up front, calls are counted.
pub(crate) struct StubProvider {
    images: Vec<MediaPayload>,
    edited: Vec<MediaPayload>,
    download_url: Option<String>,
    video: MediaPayload,
    analysis: String,
    reply: String,
    /// Pending answers remaining before the job reports Done.
    remaining_pending: AtomicU32,
    status_checks: AtomicU32,
    fetches: AtomicU32,
    submits: AtomicU32,
}

impl StubProvider {
    /// Happy-path defaults: one image per image call, job done on
    /// submission, one downloadable video, non-empty text answers.
    pub(crate) fn new() -> Self {
        Self {
            images: vec![MediaPayload::from_bytes("image/png", b"stub-image")],
            edited: vec![MediaPayload::from_bytes("image/png", b"stub-edited")],
            download_url: Some("https://stub.example/video.mp4".to_string()),
            video: MediaPayload::from_bytes("video/mp4", b"stub-video"),
            analysis: "A short clip of a sunrise.".to_string(),
            reply: "Stub answer.".to_string(),
            remaining_pending: AtomicU32::new(0),
            status_checks: AtomicU32::new(0),
            fetches: AtomicU32::new(0),
            submits: AtomicU32::new(0),
        }
    }

    /// Number of Pending answers before the job turns Done.
    pub(crate) fn with_pending_polls(self, pending: u32) -> Self {
        self.remaining_pending.store(pending, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_images(mut self, images: Vec<MediaPayload>) -> Self {
        self.images = images;
        self
    }

    pub(crate) fn with_edited(mut self, edited: Vec<MediaPayload>) -> Self {
        self.edited = edited;
        self
    }

    pub(crate) fn with_download_url(mut self, url: Option<String>) -> Self {
        self.download_url = url;
        self
    }

    pub(crate) fn with_analysis(mut self, analysis: impl Into<String>) -> Self {
        self.analysis = analysis.into();
        self
    }

    pub(crate) fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }

    /// Status checks observed so far (submission included).
    pub(crate) fn status_checks(&self) -> u32 {
        self.status_checks.load(Ordering::SeqCst)
    }

    pub(crate) fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn submits(&self) -> u32 {
        self.submits.load(Ordering::SeqCst)
    }

    fn next_status(&self) -> VideoJobStatus {
        self.status_checks.fetch_add(1, Ordering::SeqCst);
        let pending = self
            .remaining_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if pending {
            VideoJobStatus::Pending
        } else {
            VideoJobStatus::Done {
                download_url: self.download_url.clone(),
            }
        }
    }
}

#[async_trait]
impl GenerativeProvider for StubProvider {
    async fn generate_image(
        &self,
        _prompt: &str,
        _aspect_ratio: AspectRatio,
    ) -> Result<Vec<MediaPayload>, GenerationError> {
        Ok(self.images.clone())
    }

    async fn edit_image(
        &self,
        _source: &MediaPayload,
        _prompt: &str,
    ) -> Result<Vec<MediaPayload>, GenerationError> {
        Ok(self.edited.clone())
    }

    async fn submit_video(
        &self,
        _prompt: &str,
        _aspect_ratio: AspectRatio,
        _source_image: Option<&MediaPayload>,
    ) -> Result<VideoSubmission, GenerationError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        Ok(VideoSubmission {
            handle: VideoJobHandle::new("stub-job-1"),
            status: self.next_status(),
        })
    }

    async fn poll_video(
        &self,
        _handle: &VideoJobHandle,
    ) -> Result<VideoJobStatus, GenerationError> {
        Ok(self.next_status())
    }

    async fn fetch_video(&self, _download_url: &str) -> Result<MediaPayload, GenerationError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.video.clone())
    }

    async fn analyze_video(
        &self,
        _source: &MediaPayload,
        _prompt: &str,
    ) -> Result<String, GenerationError> {
        Ok(self.analysis.clone())
    }

    async fn ask(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(self.reply.clone())
    }
}

/// Provider that answers `generate_image` only after the test opens its
/// gate, and reports every video job as pending. For busy-guard and
/// late-result tests.
pub(crate) struct GatedProvider {
    gate: Arc<Notify>,
}

impl GatedProvider {
    pub(crate) fn new(gate: Arc<Notify>) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl GenerativeProvider for GatedProvider {
    async fn generate_image(
        &self,
        _prompt: &str,
        _aspect_ratio: AspectRatio,
    ) -> Result<Vec<MediaPayload>, GenerationError> {
        self.gate.notified().await;
        Ok(vec![MediaPayload::from_bytes("image/png", b"late")])
    }

    async fn edit_image(
        &self,
        _source: &MediaPayload,
        _prompt: &str,
    ) -> Result<Vec<MediaPayload>, GenerationError> {
        unreachable!()
    }

    async fn submit_video(
        &self,
        _prompt: &str,
        _aspect_ratio: AspectRatio,
        _source_image: Option<&MediaPayload>,
    ) -> Result<VideoSubmission, GenerationError> {
        Ok(VideoSubmission {
            handle: VideoJobHandle::new("gated-job"),
            status: VideoJobStatus::Pending,
        })
    }

    async fn poll_video(
        &self,
        _handle: &VideoJobHandle,
    ) -> Result<VideoJobStatus, GenerationError> {
        Ok(VideoJobStatus::Pending)
    }

    async fn fetch_video(&self, _download_url: &str) -> Result<MediaPayload, GenerationError> {
        unreachable!()
    }

    async fn analyze_video(
        &self,
        _source: &MediaPayload,
        _prompt: &str,
    ) -> Result<String, GenerationError> {
        unreachable!()
    }

    async fn ask(&self, _prompt: &str) -> Result<String, GenerationError> {
        unreachable!()
    }
}

/// Key selector that refuses: nothing selected, dialog always dismissed.
#[derive(Default)]
pub(crate) struct RefusingKeySelector {
    opened: AtomicU32,
}

impl RefusingKeySelector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Times the selection dialog was opened.
    pub(crate) fn opened(&self) -> u32 {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySelector for RefusingKeySelector {
    async fn has_selected_key(&self) -> bool {
        false
    }

    async fn open_select_key(&self) -> bool {
        self.opened.fetch_add(1, Ordering::SeqCst);
        false
    }
}
