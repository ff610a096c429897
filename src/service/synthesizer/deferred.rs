//! Backend whose API answers with a status flag and a URL to the rendered image.

use super::{build_client, ensure_success, require_key, ImageSynthesizer};
use crate::config::synthesis::SynthesisConfig;
use crate::service::prompt::Prompt;
use crate::utils::error::{Result, ThumbnailError};
use crate::utils::file::save_file;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct DeferredUrlSynthesizer {
    client: Client,
    config: SynthesisConfig,
}

impl DeferredUrlSynthesizer {
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config)?,
            config,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageSynthesizer for DeferredUrlSynthesizer {
    async fn synthesize(&self, prompt: &Prompt, dest: &Path) -> Result<PathBuf> {
        let api_key = require_key(&self.config)?;
        info!(
            "Requesting base image for prompt '{}...'",
            prompt.as_str().chars().take(40).collect::<String>()
        );

        let body = Text2ImgRequest::new(api_key, prompt, &self.config);
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let data = response.json::<Text2ImgResponse>().await.map_err(|e| {
            ThumbnailError::GenerationFailed(format!("Failed to parse response as json: {}", e))
        })?;

        if data.status != "success" {
            return Err(ThumbnailError::GenerationFailed(format!(
                "API returned status '{}': {}",
                data.status,
                data.message.unwrap_or_default()
            )));
        }
        let url = data.output.into_iter().next().ok_or_else(|| {
            ThumbnailError::GenerationFailed("API did not return an image url".into())
        })?;
        debug!(url = %url, "generation complete");

        // The URL is handed out before the backend finishes writing the image.
        tokio::time::sleep(self.config.render_delay).await;

        let image_data = self.download(&url).await?;
        save_file(dest, &image_data)?;
        info!("Base image saved to {}", dest.display());
        Ok(dest.to_path_buf())
    }

    fn name(&self) -> &'static str {
        "deferred-url"
    }
}

#[derive(Debug, Serialize)]
struct Text2ImgRequest<'a> {
    key: &'a str,
    prompt: &'a str,
    negative_prompt: &'a str,
    width: String,
    height: String,
    samples: String,
    safety_checker: &'static str,
    enhance_prompt: &'static str,
}

impl<'a> Text2ImgRequest<'a> {
    fn new(key: &'a str, prompt: &'a Prompt, config: &SynthesisConfig) -> Self {
        Self {
            key,
            prompt: prompt.as_str(),
            negative_prompt: prompt.negative(),
            width: config.width.to_string(),
            height: config.height.to_string(),
            samples: "1".into(),
            safety_checker: "yes",
            enhance_prompt: "yes",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Text2ImgResponse {
    status: String,
    #[serde(default)]
    output: Vec<String>,
    #[serde(default)]
    message: Option<String>,
}
