use anyhow::{bail, Result};
use fast_image_resize as fr;
use fr::images::Image;

use crate::decoder::FrameData;

/// Largest square centered inside a `width x height` frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRegion {
    pub left: u32,
    pub top: u32,
    pub side: u32,
}

impl CropRegion {
    pub fn centered(width: u32, height: u32) -> Self {
        let side = width.min(height);
        Self {
            left: (width - side) / 2,
            top: (height - side) / 2,
            side,
        }
    }
}

/// Turns decoder output (BGR, any size) into square RGB frames of a fixed size.
pub struct FrameNormalizer {
    target: u32,
    options: fr::ResizeOptions,
}

impl FrameNormalizer {
    pub fn new(target: u32) -> Result<Self> {
        if target == 0 {
            bail!("Target frame size must be greater than zero");
        }
        Ok(Self {
            target,
            options: fr::ResizeOptions::new()
                .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear)),
        })
    }

    pub fn normalize(&self, frame: &FrameData) -> Result<FrameData> {
        if !frame.is_well_formed() {
            bail!(
                "Frame {} is malformed: {}x{} with {} bytes",
                frame.index,
                frame.width,
                frame.height,
                frame.buffer.len()
            );
        }

        // 1. Center crop
        let region = CropRegion::centered(frame.width, frame.height);
        let cropped = crop(frame, region);

        // 2. Resize
        let src_image = Image::from_vec_u8(region.side, region.side, cropped, fr::PixelType::U8x3)?;
        let mut dst_image = Image::new(self.target, self.target, fr::PixelType::U8x3);
        let mut resizer = fr::Resizer::new();
        resizer.resize(&src_image, &mut dst_image, &self.options)?;

        // 3. BGR -> RGB
        let mut buffer = dst_image.buffer().to_vec();
        for pixel in buffer.chunks_exact_mut(3) {
            pixel.swap(0, 2);
        }

        Ok(FrameData::new(buffer, self.target, self.target, frame.index))
    }
}

fn crop(frame: &FrameData, region: CropRegion) -> Vec<u8> {
    let row_len = region.side as usize * 3;
    let src_stride = frame.width as usize * 3;
    let mut out = Vec::with_capacity(row_len * region.side as usize);

    for y in 0..region.side as usize {
        let src_offset = (region.top as usize + y) * src_stride + region.left as usize * 3;
        out.extend_from_slice(&frame.buffer[src_offset..src_offset + row_len]);
    }

    out
}
