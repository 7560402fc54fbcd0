use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::shared::constants::{DATASET_IMAGES_DIR, DATASET_LABELS_DIR, LABEL_EXTENSION};
use crate::utils::{file_utils, logger};

/// Copies the samples named in `name_list` (one stem per line) from
/// `original/{images,labels}` into `output/{images,labels}`.
///
/// All images are assumed to share the extension of the first file in
/// `original/images`.
pub fn create_subset(original: &Path, name_list: &Path, output: &Path) -> Result<usize> {
    let images_dir = original.join(DATASET_IMAGES_DIR);
    let labels_dir = original.join(DATASET_LABELS_DIR);

    let first = file_utils::sorted_files(&images_dir)?
        .into_iter()
        .next()
        .with_context(|| format!("No images found in {}", images_dir.display()))?;
    let ext = file_utils::dotted_extension(&first);

    let image_out = file_utils::ensure_dir(&output.join(DATASET_IMAGES_DIR))?;
    let label_out = file_utils::ensure_dir(&output.join(DATASET_LABELS_DIR))?;

    let names = fs::read_to_string(name_list)
        .with_context(|| format!("Failed to read name list {}", name_list.display()))?;

    let mut copied = 0;
    for name in names.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let image_name = format!("{}{}", name, ext);
        let label_name = format!("{}.{}", name, LABEL_EXTENSION);

        file_utils::copy_file(&images_dir.join(&image_name), &image_out.join(&image_name))?;
        file_utils::copy_file(&labels_dir.join(&label_name), &label_out.join(&label_name))?;
        copied += 1;
    }

    logger::info(&format!(
        "subset: copied {} sample(s) from {} to {}",
        copied,
        original.display(),
        output.display()
    ));
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(root: &Path, stems: &[&str]) {
        fs::create_dir_all(root.join("images")).unwrap();
        fs::create_dir_all(root.join("labels")).unwrap();
        for stem in stems {
            fs::write(root.join("images").join(format!("{stem}.jpg")), stem).unwrap();
            fs::write(root.join("labels").join(format!("{stem}.txt")), stem).unwrap();
        }
    }

    #[test]
    fn test_copies_listed_samples() {
        let tmp = tempfile::tempdir().unwrap();
        let original = tmp.path().join("full");
        dataset(&original, &["a", "b", "c"]);
        let list = tmp.path().join("val.txt");
        fs::write(&list, "c\n a \n\n").unwrap();

        let out = tmp.path().join("val");
        assert_eq!(create_subset(&original, &list, &out).unwrap(), 2);
        assert_eq!(fs::read_to_string(out.join("images/a.jpg")).unwrap(), "a");
        assert!(out.join("labels/c.txt").exists());
        assert!(!out.join("images/b.jpg").exists());
    }

    #[test]
    fn test_missing_sample_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let original = tmp.path().join("full");
        dataset(&original, &["a"]);
        let list = tmp.path().join("list.txt");
        fs::write(&list, "zzz\n").unwrap();

        assert!(create_subset(&original, &list, &tmp.path().join("out")).is_err());
    }

    #[test]
    fn test_empty_images_dir_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let original = tmp.path().join("full");
        dataset(&original, &[]);
        let list = tmp.path().join("list.txt");
        fs::write(&list, "a\n").unwrap();

        assert!(create_subset(&original, &list, &tmp.path().join("out")).is_err());
    }
}
