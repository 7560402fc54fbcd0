pub mod augment;
pub mod kitti;
pub mod merge;
pub mod subset;

pub use augment::AugmentSpec;
