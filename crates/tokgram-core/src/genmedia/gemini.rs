//! Gemini / Veo HTTP provider.
//!
//! generativelanguage.googleapis.com の REST サーフェスを直接叩く
//! [`GenerativeProvider`] 実装。モデルの割り当て:
//!
//! - 画像生成: `imagen-4.0-generate-001` (`:predict`)
//! - 画像編集: `gemini-2.5-flash-image` (`:generateContent`)
//! - 動画生成: `veo-3.1-fast-generate-preview` (`:predictLongRunning` + operation GET)
//! - 動画理解: `gemini-3-pro-preview` (`:generateContent`)
//! - テキスト: `gemini-2.5-flash` (`:generateContent`)
//!
//! ワイヤ型はこのファイルに閉じる。外には [`MediaPayload`] とテキストだけを返す。

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::errors::GenerationError;
use crate::domain::media::{AspectRatio, MediaPayload};
use crate::ports::provider::{
    GenerativeProvider, VideoJobHandle, VideoJobStatus, VideoSubmission,
};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const IMAGE_MODEL: &str = "imagen-4.0-generate-001";
const IMAGE_EDIT_MODEL: &str = "gemini-2.5-flash-image";
const VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
const VIDEO_ANALYSIS_MODEL: &str = "gemini-3-pro-preview";
const TEXT_MODEL: &str = "gemini-2.5-flash";

/// fast-generate は 720p/1080p をサポート。速度優先で 720p 固定。
const VIDEO_RESOLUTION: &str = "720p";

#[derive(Debug, Error)]
pub enum GeminiConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
}

/// Provider configuration, normally read from the environment.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Read `GEMINI_API_KEY`. Empty counts as unset.
    pub fn from_env() -> Result<Self, GeminiConfigError> {
        match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(Self::new(key)),
            _ => Err(GeminiConfigError::MissingApiKey),
        }
    }
}

// ============================================
// Request types
// ============================================

#[derive(Debug, Serialize)]
struct ImagePredictRequest {
    instances: Vec<ImageInstance>,
    parameters: ImageParameters,
}

#[derive(Debug, Serialize)]
struct ImageInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageParameters {
    sample_count: u32,
    aspect_ratio: String,
    output_mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Debug, Serialize)]
struct VideoPredictRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<ImageBytes>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageBytes {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    sample_count: u32,
    resolution: String,
    aspect_ratio: String,
}

// ============================================
// Response types
// ============================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ImagePredictResponse {
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoOperation {
    name: String,
    #[serde(default)]
    done: bool,
    response: Option<VideoOperationResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoOperationResult {
    generate_video_response: Option<GeneratedVideos>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GeneratedVideos {
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<VideoUri>,
}

#[derive(Debug, Deserialize)]
struct VideoUri {
    uri: Option<String>,
}

impl VideoOperation {
    fn into_status(self) -> VideoJobStatus {
        if !self.done {
            return VideoJobStatus::Pending;
        }
        let download_url = self
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|v| v.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri);
        VideoJobStatus::Done { download_url }
    }
}

// ============================================
// Client
// ============================================

pub struct GeminiProvider {
    client: Client,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GenerationError::Provider(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: config.api_key,
        })
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, GenerationError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{API_BASE}/{path}");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Provider(format!("request to {path} failed: {e}")))?;
        Self::decode_response(path, response).await
    }

    async fn get_json<R>(&self, path: &str) -> Result<R, GenerationError>
    where
        R: DeserializeOwned,
    {
        let url = format!("{API_BASE}/{path}");
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| GenerationError::Provider(format!("request to {path} failed: {e}")))?;
        Self::decode_response(path, response).await
    }

    async fn decode_response<R>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<R, GenerationError>
    where
        R: DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(%status, path, error = %error_text, "Gemini API request failed");
            return Err(GenerationError::Provider(format!(
                "Gemini API error ({status}): {error_text}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| GenerationError::Provider(format!("invalid response from {path}: {e}")))
    }

    /// First candidate's text parts, concatenated (the SDK's `response.text`).
    fn response_text(response: GenerateContentResponse) -> String {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .concat()
            })
            .unwrap_or_default()
    }

    fn inline_images(response: GenerateContentResponse) -> Vec<MediaPayload> {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.inline_data)
                    .map(|d| MediaPayload {
                        mime: d.mime_type,
                        data: d.data,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<MediaPayload>, GenerationError> {
        let request = ImagePredictRequest {
            instances: vec![ImageInstance {
                prompt: prompt.to_string(),
            }],
            parameters: ImageParameters {
                sample_count: 1,
                aspect_ratio: aspect_ratio.as_str().to_string(),
                output_mime_type: "image/jpeg".to_string(),
            },
        };

        let started = Instant::now();
        let response: ImagePredictResponse = self
            .post_json(&format!("models/{IMAGE_MODEL}:predict"), &request)
            .await?;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            predictions = response.predictions.len(),
            "image predict response received"
        );

        Ok(response
            .predictions
            .into_iter()
            .filter_map(|p| {
                p.bytes_base64_encoded.map(|data| MediaPayload {
                    mime: p.mime_type.unwrap_or_else(|| "image/jpeg".to_string()),
                    data,
                })
            })
            .collect())
    }

    async fn edit_image(
        &self,
        source: &MediaPayload,
        prompt: &str,
    ) -> Result<Vec<MediaPayload>, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: source.mime.clone(),
                            data: source.data.clone(),
                        }),
                    },
                    Part {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
            }),
        };

        let response: GenerateContentResponse = self
            .post_json(&format!("models/{IMAGE_EDIT_MODEL}:generateContent"), &request)
            .await?;
        Ok(Self::inline_images(response))
    }

    async fn submit_video(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        source_image: Option<&MediaPayload>,
    ) -> Result<VideoSubmission, GenerationError> {
        let request = VideoPredictRequest {
            instances: vec![VideoInstance {
                prompt: prompt.to_string(),
                image: source_image.map(|img| ImageBytes {
                    bytes_base64_encoded: img.data.clone(),
                    mime_type: img.mime.clone(),
                }),
            }],
            parameters: VideoParameters {
                sample_count: 1,
                resolution: VIDEO_RESOLUTION.to_string(),
                aspect_ratio: aspect_ratio.as_str().to_string(),
            },
        };

        let operation: VideoOperation = self
            .post_json(&format!("models/{VIDEO_MODEL}:predictLongRunning"), &request)
            .await?;
        let handle = VideoJobHandle::new(operation.name.clone());
        Ok(VideoSubmission {
            handle,
            status: operation.into_status(),
        })
    }

    async fn poll_video(
        &self,
        handle: &VideoJobHandle,
    ) -> Result<VideoJobStatus, GenerationError> {
        // the handle is the operation resource name, e.g.
        // "models/veo-3.1-fast-generate-preview/operations/abc123"
        let operation: VideoOperation = self.get_json(handle.as_str()).await?;
        Ok(operation.into_status())
    }

    async fn fetch_video(&self, download_url: &str) -> Result<MediaPayload, GenerationError> {
        // the download URI already carries query parameters; the key is
        // appended rather than set
        let url = format!("{download_url}&key={}", self.api_key);
        let response = self
            .client
            .get(&url)
            // video downloads can be large
            .timeout(Duration::from_secs(120))
            .send()
            .await
            .map_err(|e| GenerationError::Provider(format!("video download failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Provider(format!(
                "video download failed ({status})"
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GenerationError::Provider(format!("video download failed: {e}")))?;
        tracing::info!(bytes = bytes.len(), "video downloaded");
        Ok(MediaPayload::from_bytes("video/mp4", &bytes))
    }

    async fn analyze_video(
        &self,
        source: &MediaPayload,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: source.mime.clone(),
                            data: source.data.clone(),
                        }),
                    },
                    Part {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                ],
            }],
            generation_config: None,
        };

        let response: GenerateContentResponse = self
            .post_json(
                &format!("models/{VIDEO_ANALYSIS_MODEL}:generateContent"),
                &request,
            )
            .await?;
        Ok(Self::response_text(response))
    }

    async fn ask(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                    inline_data: None,
                }],
            }],
            generation_config: None,
        };

        let response: GenerateContentResponse = self
            .post_json(&format!("models/{TEXT_MODEL}:generateContent"), &request)
            .await?;
        Ok(Self::response_text(response))
    }
}
