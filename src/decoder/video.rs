use anyhow::{anyhow, bail, Context, Result};
use opencv::{core::Mat, prelude::*, videoio};
use std::path::Path;

use super::frame_data::{FrameData, VideoInfo};
use super::FrameSource;
use crate::utils::logger;

/// OpenCV-backed decoder. Frames come out as BGR, the capture's native order.
pub struct VideoDecoder {
    capture: videoio::VideoCapture,
    info: VideoInfo,
    next_index: usize,
}

impl VideoDecoder {
    pub fn open(path: &Path) -> Result<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Video path is not valid UTF-8: {:?}", path))?;

        logger::debug(&format!("Opening video with OpenCV: {}", path_str));

        // CAP_ANY lets OpenCV pick the backend (FFmpeg/GStreamer/AVFoundation)
        let capture = videoio::VideoCapture::from_file(path_str, videoio::CAP_ANY)
            .with_context(|| format!("Failed to create capture for: {}", path_str))?;

        if !capture.is_opened()? {
            let err_msg = format!("Failed to open video file: {}", path_str);
            logger::error(&err_msg);
            return Err(anyhow!(err_msg));
        }

        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT)? as u32;

        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        logger::debug(&format!(
            "Capture opened: {} ({}x{}, {} frames reported)",
            id, width, height, frame_count
        ));

        Ok(Self {
            capture,
            info: VideoInfo {
                id,
                width,
                height,
                frame_count,
            },
            next_index: 0,
        })
    }
}

impl FrameSource for VideoDecoder {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<FrameData>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? {
            return Ok(None); // EOF
        }

        if frame.empty() {
            return Ok(None);
        }

        if frame.channels() != 3 {
            bail!(
                "Frame {} of {} has {} channels, expected 3",
                self.next_index,
                self.info.id,
                frame.channels()
            );
        }

        // ROI-backed or padded mats need a compact copy before the bytes are usable
        let frame = if frame.is_continuous() {
            frame
        } else {
            frame.try_clone()?
        };

        let data = FrameData::new(
            frame.data_bytes()?.to_vec(),
            frame.cols() as u32,
            frame.rows() as u32,
            self.next_index,
        );
        self.next_index += 1;

        Ok(Some(data))
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        println!("releasing the capture");
        if let Err(e) = self.capture.release() {
            logger::error(&format!("Failed to release capture for {}: {}", self.info.id, e));
        }
    }
}
