pub const STYLE_QUALIFIERS: &str =
    "professional digital art, clean illustration, vibrant colors, cinematic lighting, 8k";

pub const NEGATIVE_PROMPT: &str =
    "blurry, low quality, distorted, watermark, text, letters, signature";

pub const FALLBACK_CLAUSE: &str = "award-winning art";

/// Keyword groups checked in order against the lower-cased title.
pub const KEYWORD_GROUPS: &[(&[&str], &str)] = &[
    (
        &["python", "data structures"],
        "abstract code visualization, data nodes, network, python logo",
    ),
    (
        &["docker"],
        "software containers, code deployment, developer, server rack, whale logo",
    ),
    (
        &["ai", "machine learning", "neural network"],
        "artificial intelligence, neural network, futuristic technology, data flows",
    ),
    (
        &["virtual reality", "vr"],
        "person wearing a VR headset, immersive digital world, glowing neon interface",
    ),
];
