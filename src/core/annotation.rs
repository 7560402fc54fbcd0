use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::shared::constants::{self, CLASS_NAMES};
use crate::shared::PipelineError;

/// One of the five labeled shopping actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionClass(usize);

impl ActionClass {
    pub const COUNT: usize = CLASS_NAMES.len();

    pub fn from_index(index: usize) -> Option<Self> {
        (index < Self::COUNT).then_some(Self(index))
    }

    pub fn all() -> impl Iterator<Item = ActionClass> {
        (0..Self::COUNT).filter_map(Self::from_index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn name(self) -> &'static str {
        CLASS_NAMES[self.0]
    }
}

/// Half-open frame range `[start, end)` as written in the annotation file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "(usize, usize)")]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl From<(usize, usize)> for Interval {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

impl Interval {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

#[derive(Deserialize)]
struct AnnotationFile {
    tlabs: Vec<Vec<Interval>>,
}

/// Per-class interval lists for one video, one list per [`ActionClass`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationSet {
    intervals: Vec<Vec<Interval>>,
}

impl AnnotationSet {
    pub fn new(intervals: Vec<Vec<Interval>>) -> Option<Self> {
        (intervals.len() == ActionClass::COUNT).then_some(Self { intervals })
    }

    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let file = File::open(path).map_err(|source| PipelineError::AnnotationRead {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed: AnnotationFile = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| PipelineError::AnnotationParse {
                path: path.to_path_buf(),
                source,
            })?;

        let found = parsed.tlabs.len();
        Self::new(parsed.tlabs).ok_or_else(|| PipelineError::ClassCountMismatch {
            path: path.to_path_buf(),
            found,
            expected: ActionClass::COUNT,
        })
    }

    pub fn intervals(&self, class: ActionClass) -> &[Interval] {
        &self.intervals[class.index()]
    }

    /// Classes in ascending index order, each with its intervals in file order.
    pub fn iter(&self) -> impl Iterator<Item = (ActionClass, &[Interval])> {
        ActionClass::all().map(move |class| (class, self.intervals(class)))
    }
}

/// Links a video file to its annotation file: the video's base name minus
/// `video_suffix`, followed by `label_suffix`
/// (`1_1_crop.mp4` -> `1_1_label.json`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamingConvention {
    pub video_suffix: String,
    pub label_suffix: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            video_suffix: constants::DEFAULT_VIDEO_SUFFIX.to_string(),
            label_suffix: constants::DEFAULT_LABEL_SUFFIX.to_string(),
        }
    }
}

impl NamingConvention {
    pub fn annotation_stem(&self, video: &Path) -> Result<String, PipelineError> {
        let name = video
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match name.strip_suffix(self.video_suffix.as_str()) {
            Some(stem) => Ok(stem.to_string()),
            None => Err(PipelineError::UnrecognizedVideoName {
                name,
                suffix: self.video_suffix.clone(),
            }),
        }
    }

    pub fn annotation_file_name(&self, video: &Path) -> Result<String, PipelineError> {
        Ok(format!("{}{}", self.annotation_stem(video)?, self.label_suffix))
    }

    /// Resolves the annotation file for `video`; it must already exist.
    pub fn annotation_path(&self, labels_dir: &Path, video: &Path) -> Result<PathBuf, PipelineError> {
        let expected = labels_dir.join(self.annotation_file_name(video)?);
        if expected.is_file() {
            Ok(expected)
        } else {
            Err(PipelineError::AnnotationNotFound {
                video: video.to_path_buf(),
                expected,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_class_table() {
        let names: Vec<_> = ActionClass::all().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "Reach_to_Shelf",
                "Retract_from_Shelf",
                "Hand_in_Shelf",
                "Inspect_Product",
                "Inspect_Shelf"
            ]
        );
        assert!(ActionClass::from_index(5).is_none());
        assert_eq!(ActionClass::from_index(2).unwrap().name(), "Hand_in_Shelf");
    }

    #[test]
    fn test_annotation_stem_strips_suffix() {
        let naming = NamingConvention::default();
        let video = Path::new("/data/videos/12_3_crop.mp4");
        assert_eq!(naming.annotation_stem(video).unwrap(), "12_3_");
        assert_eq!(naming.annotation_file_name(video).unwrap(), "12_3_label.json");
    }

    #[test]
    fn test_annotation_stem_rejects_other_names() {
        let naming = NamingConvention::default();
        let err = naming.annotation_stem(Path::new("clip.mp4")).unwrap_err();
        assert!(matches!(err, PipelineError::UnrecognizedVideoName { .. }));
    }

    #[test]
    fn test_annotation_path_missing_is_named_error() {
        let dir = tempfile::tempdir().unwrap();
        let naming = NamingConvention::default();
        let err = naming
            .annotation_path(dir.path(), Path::new("1_1_crop.mp4"))
            .unwrap_err();
        match err {
            PipelineError::AnnotationNotFound { expected, .. } => {
                assert_eq!(expected, dir.path().join("1_1_label.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_annotation_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1_1_label.json");
        fs::write(
            &path,
            r#"{"tlabs": [[[0, 4], [10, 12]], [], [[2, 5]], [], [[7, 9]]]}"#,
        )
        .unwrap();

        let set = AnnotationSet::load(&path).unwrap();
        let hand = ActionClass::from_index(2).unwrap();
        assert_eq!(set.intervals(hand), &[Interval { start: 2, end: 5 }]);
        assert_eq!(set.iter().count(), 5);
        assert_eq!(set.iter().next().unwrap().1.len(), 2);
    }

    #[test]
    fn test_load_rejects_wrong_class_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_label.json");
        fs::write(&path, r#"{"tlabs": [[[0, 4]], []]}"#).unwrap();
        let err = AnnotationSet::load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::ClassCountMismatch { found: 2, .. }));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_label.json");
        fs::write(&path, r#"{"tlabs": [[[0, -4]]"#).unwrap();
        let err = AnnotationSet::load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::AnnotationParse { .. }));
    }

    #[test]
    fn test_interval_len() {
        assert_eq!(Interval::from((2, 5)).len(), 3);
        assert_eq!(Interval::from((5, 2)).len(), 0);
    }
}
