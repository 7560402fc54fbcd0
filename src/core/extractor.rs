use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use super::annotation::{AnnotationSet, NamingConvention};
use super::clip_writer::{ClipWriter, WriteSummary};
use super::normalizer::FrameNormalizer;
use crate::decoder::{FrameData, FrameSource};
use crate::shared::constants;
use crate::shared::PipelineError;
use crate::utils::{file_utils, logger, time_utils::Timer};

/// Where a video currently is in the per-video pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    DecodingVideo,
    Normalizing,
    Writing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::DecodingVideo => "decoding",
            Stage::Normalizing => "normalizing",
            Stage::Writing => "writing clips",
        };
        f.write_str(name)
    }
}

/// Parameters of one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractJob {
    /// First video to process, 1-based.
    pub start: usize,
    /// Last video to process, inclusive.
    pub end: usize,
    pub labels_dir: PathBuf,
    pub video_dir: PathBuf,
    pub data_split: PathBuf,
    pub target_size: u32,
    pub image_ext: String,
    pub naming: NamingConvention,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    pub videos: usize,
    pub clips: usize,
    pub images: usize,
}

/// Runs the job over the sorted `.mp4` files of `job.video_dir`.
pub fn extract_clips<S, F>(job: &ExtractJob, open: F) -> Result<ExtractSummary>
where
    S: FrameSource,
    F: FnMut(&Path) -> Result<S>,
{
    let videos = file_utils::list_files(&job.video_dir, constants::VIDEO_EXTENSION)?;
    extract_clips_from(job, &videos, open)
}

/// Runs the job over an already enumerated video list; `job.start..=job.end`
/// selects (1-based) which entries are processed, in list order.
pub fn extract_clips_from<S, F>(job: &ExtractJob, videos: &[PathBuf], mut open: F) -> Result<ExtractSummary>
where
    S: FrameSource,
    F: FnMut(&Path) -> Result<S>,
{
    if job.start == 0 || job.start > job.end || job.end > videos.len() {
        return Err(PipelineError::VideoRangeOutOfBounds {
            start: job.start,
            end: job.end,
            available: videos.len(),
        }
        .into());
    }

    let normalizer = FrameNormalizer::new(job.target_size)?;
    let writer = ClipWriter::new(&job.data_split, &job.image_ext);
    let mut summary = ExtractSummary::default();

    logger::info(&format!(
        "extract: videos {}..={} of {} -> {}",
        job.start,
        job.end,
        videos.len(),
        job.data_split.display()
    ));

    for video_number in job.start..=job.end {
        let video = &videos[video_number - 1];
        let timer = Timer::new();

        let written = process_video(job, video_number, video, &normalizer, &writer, &mut open)
            .with_context(|| format!("video #{} ({}) failed", video_number, video.display()))?;

        summary.videos += 1;
        summary.clips += written.clips;
        summary.images += written.images;

        let msg = format!(
            "video #{} done: {} clip(s), {} image(s) in {} ms",
            video_number,
            written.clips,
            written.images,
            timer.elapsed_ms()
        );
        println!("{}", msg);
        logger::info(&msg);
    }

    Ok(summary)
}

fn process_video<S, F>(
    job: &ExtractJob,
    video_number: usize,
    video: &Path,
    normalizer: &FrameNormalizer,
    writer: &ClipWriter,
    open: &mut F,
) -> Result<WriteSummary>
where
    S: FrameSource,
    F: FnMut(&Path) -> Result<S>,
{
    // The annotation is resolved first so a missing file aborts before any decoding or output.
    let label_path = job.naming.annotation_path(&job.labels_dir, video)?;
    let annotations = AnnotationSet::load(&label_path)?;
    logger::debug(&format!("video #{} paired with {}", video_number, label_path.display()));

    let mut stage = Stage::DecodingVideo;
    let frames = {
        let mut source = open(video).with_context(|| format!("stage: {}", stage))?;
        read_normalized(&mut source, normalizer, &mut stage)
            .with_context(|| format!("stage: {}", stage))?
        // source dropped here, releasing the decoder on every path
    };

    stage = Stage::Writing;
    let written = writer
        .write_video(video_number, &frames, &annotations)
        .with_context(|| format!("stage: {}", stage))?;

    stage = Stage::Idle;
    logger::debug(&format!("video #{} back to {}", video_number, stage));

    Ok(written)
}

/// Pulls every frame from `source`, normalizing each as it arrives so raw
/// frames never accumulate.
pub fn read_normalized<S: FrameSource>(
    source: &mut S,
    normalizer: &FrameNormalizer,
    stage: &mut Stage,
) -> Result<Vec<FrameData>> {
    let info = source.info().clone();
    println!("Stream start. {}", info.id);
    logger::debug(&format!(
        "{}: {}x{}, {} frames reported",
        info.id, info.width, info.height, info.frame_count
    ));

    let mut frames = Vec::with_capacity(info.frame_count as usize);
    loop {
        *stage = Stage::DecodingVideo;
        let Some(raw) = source.next_frame()? else {
            println!("Stream end.");
            break;
        };

        *stage = Stage::Normalizing;
        frames.push(normalizer.normalize(&raw)?);
    }

    if frames.len() != info.frame_count as usize {
        logger::debug(&format!(
            "{}: decoded {} frames, container reported {}",
            info.id,
            frames.len(),
            info.frame_count
        ));
    }

    Ok(frames)
}
