//! Candidate image URL cleaning.
//!
//! The filter is conservative: rejecting a real photo is acceptable, admitting a
//! tracking pixel or a site logo is not.

use url::Url;

/// Substrings marking decorative or non-content images.
const DECORATIVE_MARKERS: &[&str] = &[
    "logo",
    "icon",
    "avatar",
    "favicon",
    "sprite",
    "placeholder",
    "1x1",
    "pixel",
    "tracking",
    "ad.",
    "/ads/",
    "banner_ad",
];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Hints that a URL without an extension is still CDN-served media.
const MEDIA_HINTS: &[&str] = &["image", "photo", "media", "cdn", "upload"];

/// Normalize a raw `src`/`content` attribute into an absolute image URL.
///
/// Returns `None` when the URL is not http(s), looks decorative, or does not
/// look like an image.
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let url = match trimmed.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => trimmed.to_string(),
    };

    let lower = url.to_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return None;
    }
    if DECORATIVE_MARKERS.iter().any(|m| lower.contains(m)) {
        return None;
    }

    let parsed = Url::parse(&url).ok()?;
    if parsed.host_str().is_none() {
        return None;
    }

    if has_image_extension(parsed.path()) || MEDIA_HINTS.iter().any(|h| lower.contains(h)) {
        Some(url)
    } else {
        None
    }
}

fn has_image_extension(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
