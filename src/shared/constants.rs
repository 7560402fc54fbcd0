pub const APP_NAME: &str = "shelfprep";

pub const ERROR_LOG_FILE: &str = "error.log";
pub const DEBUG_LOG_FILE: &str = "debug.log";

/// Action classes of the shopping-behavior dataset, indexed by annotation row.
pub const CLASS_NAMES: [&str; 5] = [
    "Reach_to_Shelf",
    "Retract_from_Shelf",
    "Hand_in_Shelf",
    "Inspect_Product",
    "Inspect_Shelf",
];

pub const VIDEO_EXTENSION: &str = "mp4";
pub const DEFAULT_VIDEO_SUFFIX: &str = "crop.mp4";
pub const DEFAULT_LABEL_SUFFIX: &str = "label.json";

pub const DEFAULT_TARGET_SIZE: u32 = 224;
pub const DEFAULT_IMAGE_EXT: &str = "png";
pub const CLIP_FRAME_DIR: &str = "rgb";
pub const FRAME_NUMBER_WIDTH: usize = 6;

pub const DATASET_IMAGES_DIR: &str = "images";
pub const DATASET_LABELS_DIR: &str = "labels";
pub const LABEL_EXTENSION: &str = "txt";
pub const MERGED_NUMBER_WIDTH: usize = 5;

/// Divisor the KITTI export applies to box extents for its "dimensions" columns.
pub const KITTI_DIMENSION_SCALE: f64 = 1000.0;
