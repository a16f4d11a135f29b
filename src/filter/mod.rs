pub mod image_url;
pub mod relevance;

pub use image_url::normalize;
pub use relevance::RelevanceFilter;
