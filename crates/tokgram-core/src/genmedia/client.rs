//! GenerativeClient - 生成パイプラインの中核
//!
//! # 学習ポイント
//!
//! ## 1. プロバイダとポリシーの分離
//! [`GenerativeProvider`] はワイヤに近い結果(画像の配列、job ステータス)を
//! 返すだけ。「最初の 1 枚を採用」「payload が無ければエラー」「5 秒ごとに
//! 上限付きでポーリング」という方針はすべてこのクライアントが持つ。
//! プロバイダ実装を差し替えてもポリシーは変わらない。
//!
//! ## 2. poll-until-done と上限
//! 動画 job は submit の応答自体が 1 回目のステータスチェック。以後は
//! [`PollPolicy`] の間隔で poll し、`max_checks` に達したら
//! [`GenerationError::Timeout`] で打ち切る。無限ループは作らない。
//!
//! ## 3. キャンセルは select! で待ち合わせ
//! 各スリープは [`CancelToken`] と `tokio::select!` で競争させる。
//! キャンセルは次のチェックを待たず、スリープ中でも即座に効く。

use std::sync::Arc;
use std::time::Instant;

use crate::domain::errors::GenerationError;
use crate::domain::generation::{GenerationKind, GenerationRequest};
use crate::domain::media::{AspectRatio, MediaPayload};
use crate::genmedia::poll::{CancelToken, PollPolicy};
use crate::ports::provider::{GenerativeProvider, KeySelector, VideoJobStatus};

/// Shown instead of an empty video-analysis answer.
pub const ANALYZE_FALLBACK: &str = "I couldn't analyze that video.";

/// Shown instead of an empty Q&A answer.
pub const ASK_FALLBACK: &str = "No response.";

/// Outcome of a dispatched generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutput {
    Media(MediaPayload),
    Text(String),
}

/// 生成 API クライアント。プロバイダ + キー選択 + ポーリング方針の束。
///
/// ハンドルは Clone で安価に複製できる(Arc の参照カウントのみ)。
#[derive(Clone)]
pub struct GenerativeClient {
    provider: Arc<dyn GenerativeProvider>,
    keys: Arc<dyn KeySelector>,
    policy: PollPolicy,
}

impl GenerativeClient {
    pub fn new(provider: Arc<dyn GenerativeProvider>, keys: Arc<dyn KeySelector>) -> Self {
        Self {
            provider,
            keys,
            policy: PollPolicy::default_video(),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Text-to-image. The provider may return several images; the first
    /// one wins. No image at all is an error, not an empty success.
    pub async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<MediaPayload, GenerationError> {
        let started = Instant::now();
        let images = self.provider.generate_image(prompt, aspect_ratio).await?;
        let image = images.into_iter().next().ok_or(GenerationError::NoImage)?;
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            mime = %image.mime,
            "image generated"
        );
        Ok(image)
    }

    /// Image editing. The edited image must come back as an inline image
    /// part; a text-only response is an error.
    pub async fn edit_image(
        &self,
        source: &MediaPayload,
        prompt: &str,
    ) -> Result<MediaPayload, GenerationError> {
        let edited = self.provider.edit_image(source, prompt).await?;
        edited
            .into_iter()
            .next()
            .ok_or(GenerationError::NoEditedImage)
    }

    /// Text-to-video.
    pub async fn generate_video(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        cancel: CancelToken,
    ) -> Result<MediaPayload, GenerationError> {
        self.video_job(prompt, aspect_ratio, None, cancel).await
    }

    /// Image-to-video: animate a still image with a motion prompt.
    pub async fn animate_image(
        &self,
        source: &MediaPayload,
        prompt: &str,
        aspect_ratio: AspectRatio,
        cancel: CancelToken,
    ) -> Result<MediaPayload, GenerationError> {
        self.video_job(prompt, aspect_ratio, Some(source), cancel)
            .await
    }

    /// Video understanding. Empty answers are replaced by a fixed
    /// fallback so the conversation surface never shows a blank bubble.
    pub async fn analyze_video(
        &self,
        source: &MediaPayload,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let text = self.provider.analyze_video(source, prompt).await?;
        if text.is_empty() {
            Ok(ANALYZE_FALLBACK.to_string())
        } else {
            Ok(text)
        }
    }

    /// Free-text Q&A with the same empty-answer fallback rule.
    pub async fn ask(&self, prompt: &str) -> Result<String, GenerationError> {
        let text = self.provider.ask(prompt).await?;
        if text.is_empty() {
            Ok(ASK_FALLBACK.to_string())
        } else {
            Ok(text)
        }
    }

    /// Dispatch one request to the operation its kind calls for.
    pub async fn run(
        &self,
        request: &GenerationRequest,
        cancel: CancelToken,
    ) -> Result<GenerationOutput, GenerationError> {
        match &request.kind {
            GenerationKind::Image => self
                .generate_image(&request.prompt, request.aspect_ratio)
                .await
                .map(GenerationOutput::Media),
            GenerationKind::Video => self
                .generate_video(&request.prompt, request.aspect_ratio, cancel)
                .await
                .map(GenerationOutput::Media),
            GenerationKind::Animate { source } => self
                .animate_image(source, &request.prompt, request.aspect_ratio, cancel)
                .await
                .map(GenerationOutput::Media),
            GenerationKind::Edit { source } => self
                .edit_image(source, &request.prompt)
                .await
                .map(GenerationOutput::Media),
            GenerationKind::Analyze { source } => self
                .analyze_video(source, &request.prompt)
                .await
                .map(GenerationOutput::Text),
        }
    }

    /// Video operations need an explicitly selected key. If none is
    /// selected, open the selection dialog once; a dismissed dialog
    /// fails the operation.
    async fn ensure_key_selected(&self) -> Result<(), GenerationError> {
        if self.keys.has_selected_key().await {
            return Ok(());
        }
        if self.keys.open_select_key().await {
            return Ok(());
        }
        Err(GenerationError::KeyNotSelected)
    }

    /// submit → poll-until-done → fetch の 3 段階。
    ///
    /// submit の応答が 1 回目のステータスチェック。Done でなければ
    /// interval 待って poll、を max_checks まで繰り返す。
    async fn video_job(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        source_image: Option<&MediaPayload>,
        mut cancel: CancelToken,
    ) -> Result<MediaPayload, GenerationError> {
        self.ensure_key_selected().await?;
        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let started = Instant::now();
        let submission = self
            .provider
            .submit_video(prompt, aspect_ratio, source_image)
            .await?;
        tracing::info!(handle = %submission.handle, "video job submitted");

        let mut checks: u32 = 1;
        let mut status = submission.status;
        let download_url = loop {
            match status {
                VideoJobStatus::Done { download_url } => break download_url,
                VideoJobStatus::Pending => {
                    if checks >= self.policy.max_checks {
                        tracing::warn!(checks, "video job still pending, giving up");
                        return Err(GenerationError::Timeout { checks });
                    }
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            tracing::info!(checks, "video job cancelled");
                            return Err(GenerationError::Cancelled);
                        }
                        _ = tokio::time::sleep(self.policy.interval) => {}
                    }
                    status = self.provider.poll_video(&submission.handle).await?;
                    checks += 1;
                    tracing::debug!(checks, done = status.is_done(), "video job polled");
                }
            }
        };

        let url = download_url.ok_or(GenerationError::NoVideo)?;
        let video = self.provider.fetch_video(&url).await?;
        tracing::info!(
            checks,
            elapsed_ms = started.elapsed().as_millis() as u64,
            mime = %video.mime,
            "video job done"
        );
        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::genmedia::poll::CancelSource;
    use crate::genmedia::testing::{RefusingKeySelector, StubProvider};
    use crate::ports::provider::AlwaysSelectedKey;

    fn client_with(provider: Arc<StubProvider>) -> GenerativeClient {
        GenerativeClient::new(provider, Arc::new(AlwaysSelectedKey))
    }

    #[tokio::test]
    async fn generate_image_returns_the_first_image() {
        let provider = Arc::new(StubProvider::new().with_images(vec![
            MediaPayload::from_bytes("image/png", b"first"),
            MediaPayload::from_bytes("image/png", b"second"),
        ]));
        let client = client_with(provider);

        let image = client
            .generate_image("a cat", AspectRatio::Square)
            .await
            .unwrap();
        assert_eq!(image.decode().unwrap(), b"first");
    }

    #[tokio::test]
    async fn generate_image_without_results_is_an_error() {
        let provider = Arc::new(StubProvider::new().with_images(vec![]));
        let client = client_with(provider);

        let err = client
            .generate_image("a cat", AspectRatio::Square)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::NoImage));
        assert_eq!(err.to_string(), "No image generated");
    }

    #[tokio::test]
    async fn edit_without_an_image_part_is_an_error() {
        let provider = Arc::new(StubProvider::new().with_edited(vec![]));
        let client = client_with(provider);

        let source = MediaPayload::from_bytes("image/png", b"src");
        let err = client.edit_image(&source, "add a hat").await.unwrap_err();
        assert!(matches!(err, GenerationError::NoEditedImage));
    }

    #[tokio::test(start_paused = true)]
    async fn video_polls_until_done() {
        // submit reports Pending, two polls later the job is Done:
        // exactly three status checks, one fetch.
        let provider = Arc::new(StubProvider::new().with_pending_polls(2));
        let client = client_with(provider.clone());

        let video = client
            .generate_video("a sunset", AspectRatio::Landscape, CancelToken::never())
            .await
            .unwrap();
        assert_eq!(video.mime, "video/mp4");
        assert_eq!(provider.status_checks(), 3);
        assert_eq!(provider.fetches(), 1);
        assert_eq!(provider.submits(), 1);
    }

    #[tokio::test]
    async fn video_done_on_submission_skips_polling() {
        let provider = Arc::new(StubProvider::new());
        let client = client_with(provider.clone());

        client
            .generate_video("a sunset", AspectRatio::Landscape, CancelToken::never())
            .await
            .unwrap();
        assert_eq!(provider.status_checks(), 1);
        assert_eq!(provider.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn video_times_out_after_max_checks() {
        let provider = Arc::new(StubProvider::new().with_pending_polls(u32::MAX));
        let client = client_with(provider.clone())
            .with_policy(PollPolicy::default_video().with_max_checks(3));

        let err = client
            .generate_video("a sunset", AspectRatio::Landscape, CancelToken::never())
            .await
            .unwrap_err();
        match err {
            GenerationError::Timeout { checks } => assert_eq!(checks, 3),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(provider.status_checks(), 3);
        assert_eq!(provider.fetches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn video_cancel_interrupts_the_wait() {
        let provider = Arc::new(StubProvider::new().with_pending_polls(u32::MAX));
        let client = client_with(provider.clone());
        let source = CancelSource::new();

        let job = {
            let client = client.clone();
            let token = source.token();
            tokio::spawn(async move {
                client
                    .generate_video("a sunset", AspectRatio::Landscape, token)
                    .await
            })
        };
        source.cancel();

        let err = job.await.unwrap().unwrap_err();
        assert!(matches!(err, GenerationError::Cancelled));
        assert_eq!(provider.fetches(), 0);
    }

    #[tokio::test]
    async fn already_cancelled_token_skips_submission() {
        let provider = Arc::new(StubProvider::new());
        let client = client_with(provider.clone());
        let source = CancelSource::new();
        source.cancel();

        let err = client
            .generate_video("a sunset", AspectRatio::Landscape, source.token())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Cancelled));
        assert_eq!(provider.submits(), 0);
    }

    #[tokio::test]
    async fn done_without_a_url_is_no_video() {
        let provider = Arc::new(StubProvider::new().with_download_url(None));
        let client = client_with(provider.clone());

        let err = client
            .generate_video("a sunset", AspectRatio::Landscape, CancelToken::never())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::NoVideo));
        assert_eq!(provider.fetches(), 0);
    }

    #[tokio::test]
    async fn video_requires_a_selected_key() {
        let provider = Arc::new(StubProvider::new());
        let keys = Arc::new(RefusingKeySelector::new());
        let client = GenerativeClient::new(provider.clone(), keys.clone());

        let err = client
            .generate_video("a sunset", AspectRatio::Landscape, CancelToken::never())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::KeyNotSelected));
        assert_eq!(keys.opened(), 1, "the selection dialog opens once");
        assert_eq!(provider.submits(), 0, "nothing is submitted without a key");
    }

    #[tokio::test]
    async fn key_selected_through_the_dialog_unblocks_video() {
        struct DialogSelector {
            opened: AtomicU32,
        }

        #[async_trait]
        impl KeySelector for DialogSelector {
            async fn has_selected_key(&self) -> bool {
                false
            }

            async fn open_select_key(&self) -> bool {
                self.opened.fetch_add(1, Ordering::SeqCst);
                true
            }
        }

        let provider = Arc::new(StubProvider::new());
        let keys = Arc::new(DialogSelector {
            opened: AtomicU32::new(0),
        });
        let client = GenerativeClient::new(provider.clone(), keys.clone());

        client
            .generate_video("a sunset", AspectRatio::Landscape, CancelToken::never())
            .await
            .unwrap();
        assert_eq!(keys.opened.load(Ordering::SeqCst), 1);
        assert_eq!(provider.submits(), 1);
    }

    #[tokio::test]
    async fn empty_analysis_falls_back() {
        let provider = Arc::new(StubProvider::new().with_analysis(""));
        let client = client_with(provider);

        let source = MediaPayload::from_bytes("video/mp4", b"clip");
        let text = client.analyze_video(&source, "what is this").await.unwrap();
        assert_eq!(text, ANALYZE_FALLBACK);
    }

    #[tokio::test]
    async fn non_empty_analysis_passes_through() {
        let provider = Arc::new(StubProvider::new().with_analysis("A drone shot."));
        let client = client_with(provider);

        let source = MediaPayload::from_bytes("video/mp4", b"clip");
        let text = client.analyze_video(&source, "what is this").await.unwrap();
        assert_eq!(text, "A drone shot.");
    }

    #[tokio::test]
    async fn empty_ask_reply_falls_back() {
        let provider = Arc::new(StubProvider::new().with_reply(""));
        let client = client_with(provider);

        assert_eq!(client.ask("hello?").await.unwrap(), ASK_FALLBACK);
    }

    #[tokio::test]
    async fn run_dispatches_by_kind() {
        let provider = Arc::new(StubProvider::new());
        let client = client_with(provider);

        let image_req = GenerationRequest::new(
            crate::domain::ids::GenerationId::from_ulid(ulid::Ulid::from_parts(1, 1)),
            GenerationKind::Image,
            "a cat",
            AspectRatio::Square,
        );
        match client.run(&image_req, CancelToken::never()).await.unwrap() {
            GenerationOutput::Media(payload) => assert_eq!(payload.mime, "image/png"),
            other => panic!("expected media, got {other:?}"),
        }

        let analyze_req = GenerationRequest::new(
            crate::domain::ids::GenerationId::from_ulid(ulid::Ulid::from_parts(1, 2)),
            GenerationKind::Analyze {
                source: MediaPayload::from_bytes("video/mp4", b"clip"),
            },
            "describe it",
            AspectRatio::Landscape,
        );
        match client.run(&analyze_req, CancelToken::never()).await.unwrap() {
            GenerationOutput::Text(text) => assert_eq!(text, "A short clip of a sunrise."),
            other => panic!("expected text, got {other:?}"),
        }
    }
}
