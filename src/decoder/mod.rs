pub mod frame_data;
pub mod video;

#[cfg(test)]
pub mod memory;

use anyhow::Result;

pub use frame_data::{FrameData, VideoInfo};
pub use video::VideoDecoder;

/// Single-pass, pull-based supply of frames in presentation order.
pub trait FrameSource {
    fn info(&self) -> &VideoInfo;

    /// Returns `Ok(None)` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<FrameData>>;
}
