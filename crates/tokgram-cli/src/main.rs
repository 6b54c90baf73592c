//! Demo walkthrough of the TokGram core.
//!
//! `GEMINI_API_KEY` があれば本物の Gemini プロバイダで、なければ
//! オフラインのデモプロバイダで、一連の画面操作を通しで実行します。

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

use tokgram_core::app::composer::{CreateTab, PickedFile};
use tokgram_core::app::settings::PayoutMethod;
use tokgram_core::app::{App, AppBuilder};
use tokgram_core::domain::errors::GenerationError;
use tokgram_core::domain::media::{AspectRatio, MediaPayload};
use tokgram_core::genmedia::poll::PollPolicy;
use tokgram_core::genmedia::{GeminiConfig, GeminiProvider};
use tokgram_core::ports::provider::{
    GenerativeProvider, VideoJobHandle, VideoJobStatus, VideoSubmission,
};

/// Offline provider: canned payloads, and a video "job" that needs two
/// polls after submission before it reports done.
struct DemoProvider {
    remaining_polls: AtomicU32,
}

impl DemoProvider {
    fn new() -> Self {
        Self {
            remaining_polls: AtomicU32::new(2),
        }
    }
}

#[async_trait]
impl GenerativeProvider for DemoProvider {
    async fn generate_image(
        &self,
        _prompt: &str,
        _aspect_ratio: AspectRatio,
    ) -> Result<Vec<MediaPayload>, GenerationError> {
        Ok(vec![MediaPayload::from_bytes("image/png", b"demo-image")])
    }

    async fn edit_image(
        &self,
        _source: &MediaPayload,
        _prompt: &str,
    ) -> Result<Vec<MediaPayload>, GenerationError> {
        Ok(vec![MediaPayload::from_bytes("image/png", b"demo-edited")])
    }

    async fn submit_video(
        &self,
        _prompt: &str,
        _aspect_ratio: AspectRatio,
        _source_image: Option<&MediaPayload>,
    ) -> Result<VideoSubmission, GenerationError> {
        Ok(VideoSubmission {
            handle: VideoJobHandle::new("demo-job"),
            status: VideoJobStatus::Pending,
        })
    }

    async fn poll_video(
        &self,
        _handle: &VideoJobHandle,
    ) -> Result<VideoJobStatus, GenerationError> {
        let was_pending = self
            .remaining_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if was_pending {
            Ok(VideoJobStatus::Pending)
        } else {
            Ok(VideoJobStatus::Done {
                download_url: Some("https://demo.invalid/clip.mp4".to_string()),
            })
        }
    }

    async fn fetch_video(&self, _download_url: &str) -> Result<MediaPayload, GenerationError> {
        Ok(MediaPayload::from_bytes("video/mp4", b"demo-video"))
    }

    async fn analyze_video(
        &self,
        _source: &MediaPayload,
        _prompt: &str,
    ) -> Result<String, GenerationError> {
        Ok("A short demo clip with nothing suspicious in it.".to_string())
    }

    async fn ask(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok("This is the offline demo provider.".to_string())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // (A) プロバイダを選択してアプリを構築
    let mut builder = AppBuilder::new();
    let offline = match GeminiConfig::from_env() {
        Ok(config) => {
            tracing::info!("using the Gemini provider");
            builder = builder.with_provider(Arc::new(GeminiProvider::new(config)?));
            false
        }
        Err(_) => {
            println!("GEMINI_API_KEY not set; running with the offline demo provider.\n");
            builder = builder
                .with_provider(Arc::new(DemoProvider::new()))
                .with_poll_policy(PollPolicy::default_video().with_interval(Duration::from_millis(50)));
            true
        }
    };
    let app = builder.build()?;
    app.seed_demo().await;

    // (B) ホームフィードとストーリー
    print_feed(&app).await;
    let stories: Vec<String> = app
        .content
        .stories()
        .await
        .iter()
        .map(|s| s.username.clone())
        .collect();
    println!("stories: {}\n", stories.join(", "));

    // (C) 閲覧操作: like / 検索 / Discover
    let top = app.content.posts().await[0].id;
    app.content.toggle_like(top).await;
    println!("liked the top post: {}", app.content.is_liked(top).await);
    let hits = app.content.search("cinematic").await;
    println!("search \"cinematic\": {} hit(s)", hits.len());
    println!("discover grid: {} tiles\n", app.content.discover_tiles().await.len());

    // (D) メッセージ: 一覧 → 返信 → 既読
    for thread in app.messages.threads().await {
        let badge = if thread.unread { "*" } else { " " };
        println!("{badge} {} ({}): {}", thread.username, thread.last_active, thread.last_message);
    }
    let first = app.messages.threads().await[0].id;
    app.messages.send(app.ids(), first, "Thanks! More coming this week.").await;
    app.messages.mark_read(first).await;
    println!("unread threads: {}\n", app.messages.unread_count().await);

    // (E) 下書き: アップロード → 保存
    app.composer.set_caption("work in progress");
    app.composer
        .select_media(PickedFile::from_bytes("sketch.png", "image/png", b"sketch".to_vec()))?;
    let draft_id = app.composer.save_draft()?;
    println!("saved draft {draft_id}; cache now holds {}\n", app.drafts.drafts().len());

    // (F) 生成: 画像 →（オフライン時のみ）動画
    app.view.open_create();
    app.composer.set_prompt("a neon city skyline at dusk");
    app.composer.set_aspect_ratio(AspectRatio::Portrait);
    if let Some(id) = app.composer.generate().await? {
        println!("generated image published as {id}");
    }
    app.view.close_create();

    if offline {
        app.view.open_create();
        app.composer.set_tab(CreateTab::Video);
        app.composer.set_prompt("drone shot over a glacier");
        if let Some(id) = app.composer.generate().await? {
            println!("generated video published as {id}");
        }
        app.view.close_create();
    }
    print_feed(&app).await;

    // (G) Live: 入室 → 配信トグル → 退室
    let mut live = app.live_session();
    live.enter().await?;
    println!("live: phase={:?}, {} track(s)", live.phase(), live.live_track_count());
    live.toggle_broadcast();
    println!("live: phase={:?}", live.phase());
    live.leave();
    println!("live: phase={:?}\n", live.phase());

    // (H) 設定: 収益化ステータスと出金
    let eligibility = app.settings.eligibility();
    println!(
        "monetization: followers {}/{}, views {}/{}, eligible={}",
        eligibility.followers,
        eligibility.required_followers,
        eligibility.views_30d,
        eligibility.required_views,
        eligibility.is_eligible(),
    );
    if let Some(remaining) = app
        .settings
        .withdraw("240.50", PayoutMethod::Upi("you@bank".to_string()))?
    {
        println!("balance after withdrawal: ${remaining:.2}");
    }

    Ok(())
}

async fn print_feed(app: &App) {
    println!("== Home feed ==");
    for post in app.content.posts().await {
        println!(
            "  [{}] @{}: {} ({} likes)",
            post.media_kind, post.author, post.caption, post.like_count
        );
    }
    println!();
}
