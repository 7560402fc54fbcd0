use anyhow::{bail, Result};
use std::cell::Cell;
use std::rc::Rc;

use super::frame_data::{FrameData, VideoInfo};
use super::FrameSource;

/// Synthetic BGR source for pipeline tests. Each frame is filled with a
/// colour derived from its index so individual frames stay identifiable.
pub struct MemorySource {
    info: VideoInfo,
    next_index: usize,
    fail_at: Option<usize>,
    released: Rc<Cell<bool>>,
}

impl MemorySource {
    pub fn new(id: &str, width: u32, height: u32, frame_count: u32) -> Self {
        Self {
            info: VideoInfo {
                id: id.to_string(),
                width,
                height,
                frame_count,
            },
            next_index: 0,
            fail_at: None,
            released: Rc::new(Cell::new(false)),
        }
    }

    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Flag that flips to true when the source is dropped.
    pub fn release_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.released)
    }

    /// BGR fill for frame `index`.
    pub fn colour_of(index: usize) -> [u8; 3] {
        [(index * 10) as u8, 100, (255 - index) as u8]
    }
}

impl FrameSource for MemorySource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<FrameData>> {
        if self.fail_at == Some(self.next_index) {
            bail!("synthetic decode failure at frame {}", self.next_index);
        }
        if self.next_index >= self.info.frame_count as usize {
            return Ok(None);
        }

        let colour = Self::colour_of(self.next_index);
        let buffer = colour
            .iter()
            .copied()
            .cycle()
            .take(FrameData::expected_len(self.info.width, self.info.height))
            .collect();

        let frame = FrameData::new(buffer, self.info.width, self.info.height, self.next_index);
        self.next_index += 1;
        Ok(Some(frame))
    }
}

impl Drop for MemorySource {
    fn drop(&mut self) {
        self.released.set(true);
    }
}
