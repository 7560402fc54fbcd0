/// One decoded or normalized video frame: interleaved 8-bit, 3 channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameData {
    pub buffer: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// 0-based position in the source video.
    pub index: usize,
}

impl FrameData {
    pub fn new(buffer: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        Self { buffer, width, height, index }
    }

    pub fn expected_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }

    pub fn is_well_formed(&self) -> bool {
        self.width > 0 && self.height > 0 && self.buffer.len() == Self::expected_len(self.width, self.height)
    }
}

/// Container-reported properties of an opened video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoInfo {
    /// Base file name, used to pair the video with its annotation file.
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub frame_count: u32,
}
