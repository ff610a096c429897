//! Stability-style backend: generated images are embedded in the response as base64.

use super::{build_client, ensure_success, require_key, ImageSynthesizer};
use crate::config::synthesis::SynthesisConfig;
use crate::service::prompt::Prompt;
use crate::utils::error::{Result, ThumbnailError};
use crate::utils::file::save_file;
use async_trait::async_trait;
use base64::{prelude::BASE64_STANDARD, Engine};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct InlineBase64Synthesizer {
    client: Client,
    config: SynthesisConfig,
}

impl InlineBase64Synthesizer {
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config)?,
            config,
        })
    }
}

#[async_trait]
impl ImageSynthesizer for InlineBase64Synthesizer {
    async fn synthesize(&self, prompt: &Prompt, dest: &Path) -> Result<PathBuf> {
        let api_key = require_key(&self.config)?;
        info!(
            "Generating base image for prompt '{}...'",
            prompt.as_str().chars().take(40).collect::<String>()
        );

        let body = TextToImageRequest::new(prompt, &self.config);
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .bearer_auth(api_key)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let data = response
            .json::<TextToImageResponse>()
            .await
            .map_err(|e| {
                ThumbnailError::GenerationFailed(format!("Failed to parse response as json: {}", e))
            })?;

        let artifact = data.artifacts.into_iter().next().ok_or_else(|| {
            ThumbnailError::GenerationFailed("API did not return image artifacts".into())
        })?;
        if artifact.finish_reason.as_deref() == Some("CONTENT_FILTERED") {
            return Err(ThumbnailError::GenerationFailed(
                "Image blocked by content filter".into(),
            ));
        }
        debug!(seed = ?artifact.seed, "received image artifact");

        let image_data = BASE64_STANDARD.decode(artifact.base64.trim()).map_err(|e| {
            ThumbnailError::GenerationFailed(format!("Failed to decode artifact: {}", e))
        })?;
        save_file(dest, &image_data)?;
        info!("Base image saved to {}", dest.display());
        Ok(dest.to_path_buf())
    }

    fn name(&self) -> &'static str {
        "inline-base64"
    }
}

#[derive(Debug, Serialize)]
struct TextPrompt<'a> {
    text: &'a str,
    weight: f32,
}

#[derive(Debug, Serialize)]
struct TextToImageRequest<'a> {
    text_prompts: Vec<TextPrompt<'a>>,
    cfg_scale: u32,
    height: u32,
    width: u32,
    samples: u32,
    steps: u32,
}

impl<'a> TextToImageRequest<'a> {
    fn new(prompt: &'a Prompt, config: &SynthesisConfig) -> Self {
        Self {
            text_prompts: vec![
                TextPrompt {
                    text: prompt.as_str(),
                    weight: 1.0,
                },
                TextPrompt {
                    text: prompt.negative(),
                    weight: -1.0,
                },
            ],
            cfg_scale: 7,
            height: config.height,
            width: config.width,
            samples: 1,
            steps: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TextToImageResponse {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Artifact {
    base64: String,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
}
