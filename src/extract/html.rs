//! HTML helpers shared by the extractors.
//!
//! `scraper::Html` is not `Send`, so every function here parses and drops the
//! document synchronously and hands back owned strings.

use scraper::{ElementRef, Html, Selector};

use crate::filter::normalize;

/// Source attributes checked on `<img>` elements embedded in feed entries.
pub const ENTRY_SRC_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src"];

/// Source attributes checked on gallery `<img>` elements of page sources.
pub const GALLERY_SRC_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src", "data-original"];

const PREVIEW_SELECTORS: &[&str] = &[
    r#"meta[property="og:image"]"#,
    r#"meta[name="twitter:image"]"#,
];

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Plain text of an HTML fragment with whitespace collapsed.
pub fn strip_tags(fragment: &str) -> String {
    let document = Html::parse_fragment(fragment);
    let text: Vec<&str> = document
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect();
    text.join(" ")
}

/// First attribute in `attrs` whose value survives URL normalization.
pub fn image_source(element: &ElementRef<'_>, attrs: &[&str]) -> Option<String> {
    attrs
        .iter()
        .filter_map(|attr| element.value().attr(attr))
        .find_map(normalize)
}

/// First usable `<img>` in an HTML fragment.
pub fn first_image(fragment: &str) -> Option<String> {
    let img = selector("img")?;
    let document = Html::parse_fragment(fragment);
    let found = document
        .select(&img)
        .find_map(|el| image_source(&el, ENTRY_SRC_ATTRS));
    found
}

/// Social preview image declared in a document's metadata.
pub fn preview_image(document: &Html) -> Option<String> {
    PREVIEW_SELECTORS
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| {
            let found = document
                .select(&sel)
                .filter_map(|meta| meta.value().attr("content"))
                .find_map(normalize);
            found
        })
}

/// Preview image of a full page given as text.
pub fn preview_image_of(html: &str) -> Option<String> {
    preview_image(&Html::parse_document(html))
}

/// Trimmed `<title>` text, if non-empty.
pub fn page_title(document: &Html) -> Option<String> {
    let title = selector("title")?;
    let text = document
        .select(&title)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string());
    text.filter(|t| !t.is_empty())
}

/// Parse a `width` attribute such as `"640"` or `"640px"`.
pub fn parse_width(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    raw.strip_suffix("px").unwrap_or(raw).trim().parse().ok()
}
