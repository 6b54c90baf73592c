//! Composer - 投稿作成フローの状態機械
//!
//! # 学習ポイント
//!
//! ## 1. ひとつの作成面、ふたつの入口
//! 生成タブ (Image / Video / Animate) とアップロードフォーム (Post /
//! Reel / Story / Live + 下書き) は同じフォーム状態を共有する。
//! フォームは `Arc<Mutex<_>>` に持ち、読み取りはスナップショット。
//!
//! ## 2. busy ガードは内部で持つ
//! 生成中はトリガーを無効化するだけでなく、二重起動を
//! [`ComposerError::Busy`] で拒否する。ガードは RAII で、どの return
//! 経路でも解除される。
//!
//! ## 3. チケット比較で遅延結果を捨てる
//! 作成面を開くたびに epoch を進め、生成開始時の epoch と完了時の
//! epoch が一致した場合だけストアに反映する。面を閉じた後に届いた
//! 結果は黙って捨てる(閉じた面の状態を書き換えない)。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::domain::draft::{Draft, DraftMode, MusicRef};
use crate::domain::errors::{GenerationError, ValidationError};
use crate::domain::generation::{GenerationKind, GenerationRequest};
use crate::domain::ids::{DraftId, PostId};
use crate::domain::media::{AspectRatio, MediaKind, MediaLocation, MediaPayload};
use crate::domain::post::Post;
use crate::genmedia::client::{GenerationOutput, GenerativeClient};
use crate::genmedia::poll::CancelSource;
use crate::ports::clock::Clock;
use crate::ports::id_generator::IdGenerator;
use crate::ports::notifier::Notifier;
use crate::store::content::ContentStore;
use crate::store::drafts::DraftCache;

/// Client-enforced upload cap.
pub const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Author attributed to everything published from this device.
pub const PUBLISH_AUTHOR: &str = "you";

/// Alert shown when a generation fails for any provider-side reason.
pub const GENERATION_FAILED_ALERT: &str =
    "Generation failed. Ensure API keys are set (User Key for Veo) or try a simpler prompt.";

const DEFAULT_CAPTION: &str = "Generated content";
const DEFAULT_ANIMATE_CAPTION: &str = "Animated masterpiece";

/// 作成面の生成タブ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateTab {
    /// テキストから画像 (Imagen)
    #[default]
    Image,
    /// テキストから動画 (Veo)
    Video,
    /// 画像から動画 (Veo image-to-video)
    Animate,
}

/// File handed over by the host's picker.
///
/// `size_bytes` comes from picker metadata, so the upload cap is checked
/// before the bytes are read or encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub mime: String,
    pub size_bytes: u64,
    pub bytes: Vec<u8>,
}

impl PickedFile {
    pub fn from_bytes(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            size_bytes: bytes.len() as u64,
            bytes,
        }
    }
}

/// Validated media sitting in the form, already self-contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedMedia {
    pub payload: MediaPayload,
    pub kind: MediaKind,
}

/// 作成フォームの全状態。読み取りは [`Composer::snapshot`] で複製。
#[derive(Debug, Clone, PartialEq)]
pub struct ComposerForm {
    pub mode: DraftMode,
    pub tab: CreateTab,
    pub prompt: String,
    pub caption: String,
    pub aspect_ratio: AspectRatio,
    pub media: Option<SelectedMedia>,
    pub music: Option<MusicRef>,
}

impl Default for ComposerForm {
    fn default() -> Self {
        Self {
            mode: DraftMode::Post,
            tab: CreateTab::Image,
            prompt: String::new(),
            caption: String::new(),
            aspect_ratio: AspectRatio::Landscape,
            media: None,
            music: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ComposerError {
    /// 別の生成が進行中
    #[error("another generation is already running")]
    Busy,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Content-authoring surface: generation tabs, upload validation, drafts.
///
/// Cloneable handle; every clone shares the same form state and guards.
#[derive(Clone)]
pub struct Composer {
    content: ContentStore,
    drafts: DraftCache,
    client: GenerativeClient,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    form: Arc<Mutex<ComposerForm>>,
    /// Bumped on open/close; generation results born under an older
    /// epoch are dropped instead of applied.
    epoch: Arc<AtomicU64>,
    cancel: Arc<Mutex<CancelSource>>,
    busy: Arc<AtomicBool>,
}

impl Composer {
    pub fn new(
        content: ContentStore,
        drafts: DraftCache,
        client: GenerativeClient,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            content,
            drafts,
            client,
            ids,
            clock,
            notifier,
            form: Arc::new(Mutex::new(ComposerForm::default())),
            epoch: Arc::new(AtomicU64::new(0)),
            cancel: Arc::new(Mutex::new(CancelSource::new())),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current form state, cloned.
    pub fn snapshot(&self) -> ComposerForm {
        self.form
            .lock()
            .map(|form| form.clone())
            .unwrap_or_default()
    }

    /// Whether a generation is in flight (UI disables its trigger).
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Open the create surface with a fresh form.
    pub fn open(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.clear_form();
    }

    /// Close the create surface: cancel in-flight work and make sure any
    /// result that still arrives is not applied.
    pub fn close(&self) {
        if let Ok(mut cancel) = self.cancel.lock() {
            cancel.cancel();
            *cancel = CancelSource::new();
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.clear_form();
    }

    pub fn set_mode(&self, mode: DraftMode) {
        if let Ok(mut form) = self.form.lock() {
            form.mode = mode;
        }
    }

    pub fn set_tab(&self, tab: CreateTab) {
        if let Ok(mut form) = self.form.lock() {
            form.tab = tab;
        }
    }

    pub fn set_prompt(&self, prompt: impl Into<String>) {
        if let Ok(mut form) = self.form.lock() {
            form.prompt = prompt.into();
        }
    }

    pub fn set_caption(&self, caption: impl Into<String>) {
        if let Ok(mut form) = self.form.lock() {
            form.caption = caption.into();
        }
    }

    pub fn set_aspect_ratio(&self, aspect_ratio: AspectRatio) {
        if let Ok(mut form) = self.form.lock() {
            form.aspect_ratio = aspect_ratio;
        }
    }

    /// Put a picked file into the form, enforcing the upload constraints.
    ///
    /// Checks run before the file is encoded: an oversized pick or a
    /// non-video pick in Reel mode is rejected with an alert and the
    /// form keeps its previous media.
    pub fn select_media(&self, pick: PickedFile) -> Result<(), ComposerError> {
        if pick.size_bytes > MAX_UPLOAD_BYTES {
            return Err(self.reject(ValidationError::FileTooLarge {
                size_bytes: pick.size_bytes,
            }));
        }

        let kind = MediaKind::from_mime(&pick.mime);
        if self.mode() == DraftMode::Reel && kind != Some(MediaKind::Video) {
            return Err(self.reject(ValidationError::ReelRequiresVideo { mime: pick.mime }));
        }
        // unrecognized types preview as images
        let kind = kind.unwrap_or(MediaKind::Image);

        let payload = MediaPayload::from_bytes(&pick.mime, &pick.bytes);
        if let Ok(mut form) = self.form.lock() {
            form.media = Some(SelectedMedia { payload, kind });
        }
        Ok(())
    }

    /// Attach a music track to the form. Audio files only.
    pub fn select_music(&self, pick: PickedFile) -> Result<(), ComposerError> {
        if !pick.mime.starts_with("audio/") {
            return Err(self.reject(ValidationError::MusicRequiresAudio { mime: pick.mime }));
        }
        if let Ok(mut form) = self.form.lock() {
            form.music = Some(MusicRef::new(pick.name, pick.mime));
        }
        Ok(())
    }

    /// Save the current form as a draft and clear the form.
    ///
    /// The draft carries the media as an encoded payload, so it stays
    /// readable after a reload regardless of where the bytes came from.
    pub fn save_draft(&self) -> Result<DraftId, ComposerError> {
        let form = self.snapshot();
        let Some(media) = form.media else {
            return Err(self.reject(ValidationError::DraftRequiresMedia));
        };

        let mut draft = Draft::new(
            self.ids.generate_draft_id(),
            form.mode,
            form.caption,
            media.payload,
            media.kind,
            self.clock.now(),
        );
        if let Some(music) = form.music {
            draft = draft.with_music(music);
        }
        let id = draft.id;
        self.drafts.save_draft(draft);
        self.clear_form();
        Ok(id)
    }

    /// Copy a stored draft back into the form. The draft itself stays in
    /// the cache. Returns false when the id is unknown.
    pub fn load_draft(&self, id: DraftId) -> bool {
        let Some(draft) = self.drafts.load_draft(id) else {
            return false;
        };
        if let Ok(mut form) = self.form.lock() {
            form.mode = draft.mode;
            form.caption = draft.caption;
            form.media = Some(SelectedMedia {
                kind: draft.media_kind,
                payload: draft.media,
            });
            form.music = draft.music;
        }
        true
    }

    /// Run the active tab's generation and publish the result as a post.
    ///
    /// Returns the new post's id, or `None` when the surface was closed
    /// while the request was in flight and the result was dropped.
    pub async fn generate(&self) -> Result<Option<PostId>, ComposerError> {
        let _busy = BusyGuard::acquire(&self.busy).ok_or(ComposerError::Busy)?;

        let form = self.snapshot();
        let kind = match form.tab {
            CreateTab::Image => GenerationKind::Image,
            CreateTab::Video => GenerationKind::Video,
            CreateTab::Animate => {
                let source = form
                    .media
                    .as_ref()
                    .filter(|media| media.kind == MediaKind::Image);
                match source {
                    Some(media) => GenerationKind::Animate {
                        source: media.payload.clone(),
                    },
                    None => return Err(self.reject(ValidationError::AnimateRequiresImage)),
                }
            }
        };

        let ticket = self.epoch.load(Ordering::SeqCst);
        let token = self
            .cancel
            .lock()
            .map(|cancel| cancel.token())
            .map_err(|_| ComposerError::Generation(GenerationError::Cancelled))?;
        let request = GenerationRequest::new(
            self.ids.generate_generation_id(),
            kind,
            form.prompt.clone(),
            form.aspect_ratio,
        );

        let output = match self.client.run(&request, token).await {
            Ok(output) => output,
            Err(GenerationError::Cancelled) => {
                // closing the surface cancels; no alert for that
                tracing::info!("generation cancelled");
                return Err(GenerationError::Cancelled.into());
            }
            Err(err) => {
                tracing::error!(error = %err, "generation failed");
                self.notifier.alert(GENERATION_FAILED_ALERT);
                return Err(err.into());
            }
        };

        if self.epoch.load(Ordering::SeqCst) != ticket {
            tracing::info!("dropping generation result for a closed surface");
            return Ok(None);
        }

        let GenerationOutput::Media(payload) = output else {
            // media tabs never produce text output
            return Ok(None);
        };

        let media_kind = match form.tab {
            CreateTab::Image => MediaKind::Image,
            CreateTab::Video | CreateTab::Animate => MediaKind::Video,
        };
        let caption = if form.prompt.is_empty() {
            match form.tab {
                CreateTab::Animate => DEFAULT_ANIMATE_CAPTION,
                _ => DEFAULT_CAPTION,
            }
            .to_string()
        } else {
            form.prompt.clone()
        };

        let post = Post::new(
            self.ids.generate_post_id(),
            media_kind,
            MediaLocation::Encoded(payload),
            PUBLISH_AUTHOR,
            caption,
        )
        .with_aspect_ratio(form.aspect_ratio);
        let id = post.id;
        self.content.add_post(post).await;

        // publishing dismisses the surface, like the modal closing
        self.close();
        Ok(Some(id))
    }

    fn mode(&self) -> DraftMode {
        self.form
            .lock()
            .map(|form| form.mode)
            .unwrap_or(DraftMode::Post)
    }

    fn clear_form(&self) {
        if let Ok(mut form) = self.form.lock() {
            *form = ComposerForm::default();
        }
    }

    /// Alert + abort: every validation failure goes through here.
    fn reject(&self, err: ValidationError) -> ComposerError {
        self.notifier.alert(&err.to_string());
        err.into()
    }
}

/// RAII busy flag: released on every exit path of `generate`.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self { flag })
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
