use garde::Validate;
use serde::Deserialize;

pub const MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GenerateThumbnailRequest {
    #[serde(default)]
    #[garde(length(chars, min = 1, max = 200))]
    pub title: Option<String>,
}

impl GenerateThumbnailRequest {
    /// Trims the title; a blank title becomes `None`.
    pub fn normalized(self) -> Self {
        let title = self
            .title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty());
        Self { title }
    }
}
