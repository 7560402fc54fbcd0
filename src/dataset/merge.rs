use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants::{DATASET_IMAGES_DIR, DATASET_LABELS_DIR, LABEL_EXTENSION, MERGED_NUMBER_WIDTH};
use crate::utils::{file_utils, logger};

/// First subdirectory of `dir` (sorted) whose name contains `needle`.
fn find_subdir(dir: &Path, needle: &str) -> Result<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    dirs.into_iter()
        .find(|path| {
            path.file_name()
                .map_or(false, |name| name.to_string_lossy().contains(needle))
        })
        .with_context(|| format!("No '{}' folder found in {}", needle, dir.display()))
}

/// Copies one dataset into the merged output, numbering from `count`.
fn append_dataset(source: &Path, images_out: &Path, labels_out: &Path, mut count: usize) -> Result<usize> {
    let images = find_subdir(source, "image")?;
    let labels = find_subdir(source, "label")?;

    for image in file_utils::sorted_files(&images)? {
        let number = format!("{:0width$}", count, width = MERGED_NUMBER_WIDTH);
        let new_image = images_out.join(format!("{}{}", number, file_utils::dotted_extension(&image)));

        let stem = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = labels.join(format!("{}.{}", stem, LABEL_EXTENSION));
        let new_label = labels_out.join(format!("{}.{}", number, LABEL_EXTENSION));

        file_utils::copy_file(&image, &new_image)?;
        file_utils::copy_file(&label, &new_label)?;

        let msg = format!("Original Image: {} New Image: {}", image.display(), new_image.display());
        println!("{}", msg);
        logger::debug(&msg);

        count += 1;
    }

    Ok(count)
}

/// Merges two `images/` + `labels/` datasets into `output`, renaming every
/// sample to a running 5-digit number. Returns the number of samples.
pub fn combine_datasets(first: &Path, second: &Path, output: &Path) -> Result<usize> {
    let images_out = file_utils::ensure_dir(&output.join(DATASET_IMAGES_DIR))?;
    let labels_out = file_utils::ensure_dir(&output.join(DATASET_LABELS_DIR))?;

    let count = append_dataset(first, &images_out, &labels_out, 0)?;
    let count = append_dataset(second, &images_out, &labels_out, count)?;

    println!("Done combining");
    logger::info(&format!("merge: {} sample(s) written to {}", count, output.display()));
    Ok(count)
}
