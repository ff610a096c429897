//! Text-to-image backends.
//!
//! Each backend turns a [`Prompt`] into an image file on disk. The variants
//! differ only in how the remote API hands the image back.

pub mod deferred;
pub mod inline;

use crate::config::synthesis::{SynthesisBackend, SynthesisConfig};
use crate::service::prompt::Prompt;
use crate::utils::error::{Result, ThumbnailError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use deferred::DeferredUrlSynthesizer;
pub use inline::InlineBase64Synthesizer;

#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Generates an image for `prompt` and writes it to `dest`.
    async fn synthesize(&self, prompt: &Prompt, dest: &Path) -> Result<PathBuf>;

    fn name(&self) -> &'static str;
}

/// Builds the backend selected by `config.backend`.
pub fn from_config(config: &SynthesisConfig) -> Result<Arc<dyn ImageSynthesizer>> {
    let synthesizer: Arc<dyn ImageSynthesizer> = match config.backend {
        SynthesisBackend::Inline => Arc::new(InlineBase64Synthesizer::new(config.clone())?),
        SynthesisBackend::Deferred => Arc::new(DeferredUrlSynthesizer::new(config.clone())?),
    };
    Ok(synthesizer)
}

pub(crate) fn build_client(config: &SynthesisConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| ThumbnailError::Internal(format!("Failed to build HTTP client: {}", e)))
}

pub(crate) fn require_key(config: &SynthesisConfig) -> Result<&str> {
    config
        .api_key
        .as_deref()
        .ok_or(ThumbnailError::MissingCredential)
}

/// Maps a non-2xx answer to a network error carrying the body text.
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    let text = response.text().await.unwrap_or_default();
    Err(ThumbnailError::Network(format!(
        "{} returned {}: {}",
        url,
        status.as_u16(),
        text.chars().take(200).collect::<String>()
    )))
}
