use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions of the extraction pipeline that callers may want to match on.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("annotation file not found for video {video:?}: expected {expected:?}")]
    AnnotationNotFound { video: PathBuf, expected: PathBuf },
    #[error("video file name {name:?} does not end with {suffix:?}")]
    UnrecognizedVideoName { name: String, suffix: String },
    #[error("failed to read annotation file {path:?}: {source}")]
    AnnotationRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse annotation file {path:?}: {source}")]
    AnnotationParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("annotation file {path:?} has {found} class rows, expected {expected}")]
    ClassCountMismatch {
        path: PathBuf,
        found: usize,
        expected: usize,
    },
    #[error("{class} occurrence {occurrence} references frame {index}, but only {frame_count} frames were decoded")]
    FrameIndexOutOfRange {
        class: &'static str,
        occurrence: usize,
        index: usize,
        frame_count: usize,
    },
    #[error("video range {start}..={end} is outside the {available} available videos")]
    VideoRangeOutOfBounds {
        start: usize,
        end: usize,
        available: usize,
    },
}
