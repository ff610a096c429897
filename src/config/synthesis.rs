use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const STABILITY_TEXT_TO_IMAGE_URL: &str =
    "https://api.stability.ai/v1/generation/stable-diffusion-v1-6/text-to-image";
pub const DEFERRED_TEXT_TO_IMAGE_URL: &str = "https://stablediffusionapi.com/api/v3/text2img";

/// Response shape of the remote text-to-image API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SynthesisBackend {
    /// Images come back base64-encoded in the response body.
    #[default]
    Inline,
    /// The response carries a status and a URL to fetch the image from.
    Deferred,
}

impl SynthesisBackend {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Inline => STABILITY_TEXT_TO_IMAGE_URL,
            Self::Deferred => DEFERRED_TEXT_TO_IMAGE_URL,
        }
    }
}

impl FromStr for SynthesisBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inline" | "stability" => Ok(Self::Inline),
            "deferred" | "url" => Ok(Self::Deferred),
            other => Err(format!("Unknown SYNTHESIS_BACKEND '{}'", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SynthesisConfig {
    pub backend: SynthesisBackend,
    /// Absence is reported per call, not at startup.
    pub api_key: Option<String>,
    pub endpoint: Url,
    pub timeout: Duration,
    /// Wait before fetching a deferred result URL.
    pub render_delay: Duration,
    pub width: u32,
    pub height: u32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        let backend = SynthesisBackend::default();
        Self {
            backend,
            api_key: None,
            endpoint: Url::parse(backend.default_endpoint()).expect("default endpoint is valid"),
            timeout: Duration::from_secs(60),
            render_delay: Duration::from_millis(3000),
            width: 1024,
            height: 512,
        }
    }
}

impl SynthesisConfig {
    pub fn init_from_env(&mut self) -> Result<(), String> {
        if let Ok(backend) = env::var("SYNTHESIS_BACKEND") {
            self.backend = backend.parse()?;
        }

        self.api_key = env::var("SYNTHESIS_API_KEY")
            .or_else(|_| env::var("STABILITY_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());

        let endpoint = env::var("SYNTHESIS_ENDPOINT")
            .unwrap_or_else(|_| self.backend.default_endpoint().to_string());
        self.endpoint = Url::parse(&endpoint)
            .map_err(|e| format!("SYNTHESIS_ENDPOINT is not a valid URL: {}", e))?;

        if let Ok(secs) = env::var("SYNTHESIS_TIMEOUT_SECS") {
            let secs = secs
                .parse::<u64>()
                .map_err(|_| "SYNTHESIS_TIMEOUT_SECS is not a valid u64".to_string())?;
            self.timeout = Duration::from_secs(secs);
        }

        if let Ok(millis) = env::var("SYNTHESIS_RENDER_DELAY_MS") {
            let millis = millis
                .parse::<u64>()
                .map_err(|_| "SYNTHESIS_RENDER_DELAY_MS is not a valid u64".to_string())?;
            self.render_delay = Duration::from_millis(millis);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("inline".parse(), Ok(SynthesisBackend::Inline));
        assert_eq!(" Deferred ".parse(), Ok(SynthesisBackend::Deferred));
        assert_eq!("url".parse(), Ok(SynthesisBackend::Deferred));
        assert!("dalle".parse::<SynthesisBackend>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = SynthesisConfig::default();
        assert_eq!(config.backend, SynthesisBackend::Inline);
        assert!(config.api_key.is_none());
        assert_eq!(config.endpoint.as_str(), STABILITY_TEXT_TO_IMAGE_URL);
        assert_eq!((config.width, config.height), (1024, 512));
    }
}
