pub mod image;
pub mod snapshot;
pub mod source;

pub use image::CandidateImage;
pub use snapshot::Snapshot;
pub use source::{Layer, SourceDescriptor, SourceKind};
