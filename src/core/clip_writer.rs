use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::annotation::{ActionClass, AnnotationSet};
use crate::decoder::FrameData;
use crate::shared::constants;
use crate::shared::PipelineError;
use crate::utils::logger;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub clips: usize,
    pub images: usize,
}

/// Writes annotated intervals of a normalized frame sequence as numbered
/// image files under `{root}/{class}/clip_{video}_{occurrence}/rgb/`.
pub struct ClipWriter {
    output_root: PathBuf,
    image_ext: String,
}

impl ClipWriter {
    pub fn new(output_root: impl Into<PathBuf>, image_ext: &str) -> Self {
        Self {
            output_root: output_root.into(),
            image_ext: image_ext.trim_start_matches('.').to_string(),
        }
    }

    pub fn clip_dir(&self, class: ActionClass, video_number: usize, occurrence: usize) -> PathBuf {
        self.output_root
            .join(class.name())
            .join(format!("clip_{}_{}", video_number, occurrence))
            .join(constants::CLIP_FRAME_DIR)
    }

    pub fn frame_path(&self, clip_dir: &Path, sequence: usize) -> PathBuf {
        clip_dir.join(format!(
            "{:0width$}.{}",
            sequence,
            self.image_ext,
            width = constants::FRAME_NUMBER_WIDTH
        ))
    }

    /// Classes are visited in index order and intervals in file order; the
    /// occurrence counter starts at 1 for every class of every video.
    /// Intervals are trusted as-is: an index past the decoded frames aborts.
    pub fn write_video(
        &self,
        video_number: usize,
        frames: &[FrameData],
        annotations: &AnnotationSet,
    ) -> Result<WriteSummary> {
        let mut summary = WriteSummary::default();

        for (class, intervals) in annotations.iter() {
            logger::debug(&format!(
                "video {}: {} has {} interval(s)",
                video_number,
                class.name(),
                intervals.len()
            ));

            for (i, interval) in intervals.iter().enumerate() {
                let occurrence = i + 1;
                let clip_dir = self.clip_dir(class, video_number, occurrence);
                let mut sequence = 1;
                logger::debug(&format!(
                    "{} occurrence {}: frames {}..{} ({} images)",
                    class.name(),
                    occurrence,
                    interval.start,
                    interval.end,
                    interval.len()
                ));

                for x in interval.start..interval.end {
                    let frame = frames.get(x).ok_or(PipelineError::FrameIndexOutOfRange {
                        class: class.name(),
                        occurrence,
                        index: x,
                        frame_count: frames.len(),
                    })?;

                    if sequence == 1 && !clip_dir.is_dir() {
                        println!("creating new dir {}", clip_dir.display());
                        fs::create_dir_all(&clip_dir).with_context(|| {
                            format!("Failed to create directory: {}", clip_dir.display())
                        })?;
                    }

                    let path = self.frame_path(&clip_dir, sequence);
                    save_frame(frame, &path)?;
                    sequence += 1;
                }

                if sequence > 1 {
                    summary.clips += 1;
                    summary.images += sequence - 1;
                }
            }
        }

        Ok(summary)
    }
}

fn save_frame(frame: &FrameData, path: &Path) -> Result<()> {
    image::save_buffer(
        path,
        &frame.buffer,
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
    )
    .with_context(|| format!("Failed to write frame {} to {}", frame.index, path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotation::Interval;

    fn frames(count: usize, size: u32) -> Vec<FrameData> {
        (0..count)
            .map(|i| {
                let buffer = vec![i as u8; FrameData::expected_len(size, size)];
                FrameData::new(buffer, size, size, i)
            })
            .collect()
    }

    fn annotations(rows: [&[(usize, usize)]; 5]) -> AnnotationSet {
        AnnotationSet::new(
            rows.iter()
                .map(|row| row.iter().copied().map(Interval::from).collect())
                .collect(),
        )
        .unwrap()
    }

    fn hand() -> ActionClass {
        ActionClass::from_index(2).unwrap()
    }

    #[test]
    fn test_paths_follow_layout() {
        let writer = ClipWriter::new("train", ".png");
        let dir = writer.clip_dir(hand(), 4, 2);
        assert_eq!(dir, PathBuf::from("train/Hand_in_Shelf/clip_4_2/rgb"));
        assert_eq!(
            writer.frame_path(&dir, 12),
            PathBuf::from("train/Hand_in_Shelf/clip_4_2/rgb/000012.png")
        );
    }

    #[test]
    fn test_interval_writes_numbered_sequence() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ClipWriter::new(tmp.path(), "png");
        let set = annotations([&[], &[], &[(2, 5)], &[], &[]]);

        let summary = writer.write_video(1, &frames(10, 4), &set).unwrap();
        assert_eq!(summary, WriteSummary { clips: 1, images: 3 });

        let dir = writer.clip_dir(hand(), 1, 1);
        for (seq, source) in [(1, 2u8), (2, 3), (3, 4)] {
            let img = image::open(writer.frame_path(&dir, seq)).unwrap().to_rgb8();
            assert_eq!(img.get_pixel(0, 0).0, [source; 3]);
        }
        assert!(!writer.frame_path(&dir, 4).exists());
    }

    #[test]
    fn test_occurrences_are_counted_per_class() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ClipWriter::new(tmp.path(), "png");
        let set = annotations([&[(0, 2)], &[], &[(1, 3), (6, 7)], &[], &[]]);

        writer.write_video(3, &frames(8, 2), &set).unwrap();

        let reach = ActionClass::from_index(0).unwrap();
        assert!(writer.frame_path(&writer.clip_dir(reach, 3, 1), 2).exists());
        let first = writer.clip_dir(hand(), 3, 1);
        let second = writer.clip_dir(hand(), 3, 2);
        assert!(writer.frame_path(&first, 2).exists());
        assert!(writer.frame_path(&second, 1).exists());
        assert!(!writer.frame_path(&second, 2).exists());
    }

    #[test]
    fn test_out_of_range_interval_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ClipWriter::new(tmp.path(), "png");
        let set = annotations([&[], &[], &[], &[(3, 12)], &[]]);

        let err = writer.write_video(1, &frames(10, 2), &set).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::FrameIndexOutOfRange { index, frame_count, .. }) => {
                assert_eq!((*index, *frame_count), (10, 10));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // frames before the bad index were already written
        let dir = writer.clip_dir(ActionClass::from_index(3).unwrap(), 1, 1);
        assert!(writer.frame_path(&dir, 7).exists());
    }

    #[test]
    fn test_empty_interval_consumes_occurrence_without_output() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ClipWriter::new(tmp.path(), "png");
        let set = annotations([&[], &[], &[(4, 4), (0, 1)], &[], &[]]);

        let summary = writer.write_video(1, &frames(5, 2), &set).unwrap();
        assert_eq!(summary, WriteSummary { clips: 1, images: 1 });
        assert!(!writer.clip_dir(hand(), 1, 1).exists());
        assert!(writer.clip_dir(hand(), 1, 2).exists());
    }

    #[test]
    fn test_rewrite_reuses_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ClipWriter::new(tmp.path(), "png");
        let set = annotations([&[], &[(0, 3)], &[], &[], &[]]);
        let input = frames(3, 4);

        writer.write_video(1, &input, &set).unwrap();
        let dir = writer.clip_dir(ActionClass::from_index(1).unwrap(), 1, 1);
        let first = fs::read(writer.frame_path(&dir, 3)).unwrap();

        writer.write_video(1, &input, &set).unwrap();
        assert_eq!(fs::read(writer.frame_path(&dir, 3)).unwrap(), first);
    }
}
