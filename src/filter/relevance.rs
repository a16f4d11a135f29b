use serde::{Deserialize, Serialize};

pub const DEFAULT_ALLOW_TERMS: &[&str] = &[
    "menswear", "men", "graphic tee", "t-shirt", "streetwear", "activewear", "gym", "athletic",
    "print", "graphic", "collection", "drop", "apparel", "clothing", "track", "performance",
    "sportswear", "gothic", "skull", "illustration", "artwork", "design", "aesthetic", "vintage",
    "retro", "wash", "dye", "heavyweight", "oversized", "merch", "band", "metal", "fabric",
    "textile", "season", "fashion", "runway", "lookbook", "silhouette", "colour", "color",
    "palette", "texture", "treatment", "garment", "cotton", "nylon", "technical", "functional",
    "colourway", "collaboration", "limited", "release", "archive", "typography", "slogan",
    "badge", "sport", "culture", "editorial", "style",
];

pub const DEFAULT_AVOID_TERMS: &[&str] = &[
    "women's", "womenswear", "handbag", "heel", "makeup", "beauty", "skincare", "jewellery",
    "jewelry", "bridal", "baby", "maternity", "fragrance", "lingerie", "nail", "hair care",
];

/// Textual on-topic classifier.
///
/// Text is rejected outright when it mentions any avoid term, even if it also
/// mentions allow terms. Otherwise it is accepted when at least one allow term
/// occurs. Matching is case-insensitive substring search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceFilter {
    pub allow: Vec<String>,
    pub avoid: Vec<String>,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOW_TERMS, DEFAULT_AVOID_TERMS)
    }
}

impl RelevanceFilter {
    pub fn new<S: AsRef<str>>(allow: &[S], avoid: &[S]) -> Self {
        let lower = |terms: &[S]| {
            terms
                .iter()
                .map(|t| t.as_ref().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect()
        };
        Self {
            allow: lower(allow),
            avoid: lower(avoid),
        }
    }

    pub fn is_relevant(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let text = text.to_lowercase();
        if self.avoid.iter().any(|term| text.contains(&term.to_lowercase())) {
            return false;
        }
        self.allow.iter().any(|term| text.contains(&term.to_lowercase()))
    }
}
