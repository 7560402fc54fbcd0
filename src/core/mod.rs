pub mod annotation;
pub mod clip_writer;
pub mod extractor;
pub mod normalizer;

pub use annotation::NamingConvention;
pub use extractor::{extract_clips, ExtractJob};
