use crate::config::constant::{FALLBACK_CLAUSE, KEYWORD_GROUPS, NEGATIVE_PROMPT, STYLE_QUALIFIERS};
use std::fmt;

/// Image-generation prompt derived from a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    text: String,
}

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn negative(&self) -> &'static str {
        NEGATIVE_PROMPT
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Builds the prompt for `title`. The first keyword group found in the
/// lower-cased title contributes its clause; later groups are never combined.
pub fn build_prompt(title: &str) -> Prompt {
    let base = format!("{}, {}", title, STYLE_QUALIFIERS);
    let title_lower = title.to_lowercase();

    let clause = KEYWORD_GROUPS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| title_lower.contains(k)))
        .map(|(_, clause)| *clause)
        .unwrap_or(FALLBACK_CLAUSE);

    Prompt {
        text: format!("{}, {}", base, clause),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCKER: &str = "software containers, code deployment";
    const PYTHON: &str = "abstract code visualization";
    const AI: &str = "artificial intelligence, neural network";
    const VR: &str = "person wearing a VR headset";

    fn clauses_in(prompt: &Prompt) -> Vec<&'static str> {
        [PYTHON, DOCKER, AI, VR, FALLBACK_CLAUSE]
            .into_iter()
            .filter(|c| prompt.as_str().contains(c))
            .collect()
    }

    #[test]
    fn test_docker_titles_get_only_docker_clause() {
        for title in [
            "Docker for Beginners",
            "Shipping with DOCKER compose",
            "Why dockerfiles matter",
        ] {
            let prompt = build_prompt(title);
            assert_eq!(clauses_in(&prompt), vec![DOCKER], "title: {title}");
        }
    }

    #[test]
    fn test_unmatched_title_uses_fallback() {
        let prompt = build_prompt("Gardening Tips for Spring");
        assert_eq!(clauses_in(&prompt), vec![FALLBACK_CLAUSE]);
        assert!(prompt.as_str().ends_with(", award-winning art"));
    }

    #[test]
    fn test_first_matching_group_wins() {
        // Matches both the python and the ai group.
        let prompt = build_prompt("Python for Machine Learning");
        assert_eq!(clauses_in(&prompt), vec![PYTHON]);

        // Matches docker and vr; docker is listed first.
        let prompt = build_prompt("Docker on VR rigs");
        assert_eq!(clauses_in(&prompt), vec![DOCKER]);
    }

    #[test]
    fn test_substring_matching() {
        // "ai" is matched as a substring, as in "maintain".
        let prompt = build_prompt("How to Maintain a Garden");
        assert_eq!(clauses_in(&prompt), vec![AI]);
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt("The Rise of Generative AI");
        assert_eq!(
            prompt.to_string(),
            "The Rise of Generative AI, professional digital art, clean illustration, \
             vibrant colors, cinematic lighting, 8k, artificial intelligence, neural network, \
             futuristic technology, data flows"
        );
        assert_eq!(prompt, build_prompt("The Rise of Generative AI"));
    }
}
