use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants;
use crate::utils::{file_utils, logger};

#[derive(Debug, Deserialize)]
struct VocAnnotation {
    #[serde(rename = "object", default)]
    objects: Vec<VocObject>,
}

#[derive(Debug, Deserialize)]
struct VocObject {
    name: String,
    bndbox: BndBox,
}

#[derive(Debug, Deserialize)]
struct BndBox {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

/// Renders a number the way the KITTI files in this pipeline expect:
/// always with a decimal point (`12` -> `12.0`).
fn kitti_number(value: f64) -> String {
    let s = value.to_string();
    if s.contains('.') || !value.is_finite() {
        s
    } else {
        s + ".0"
    }
}

/// Converts the text of a Pascal-VOC XML file into KITTI label lines.
///
/// Only class, 2D box and a box-derived "dimensions" pair are meaningful; the
/// remaining columns are fixed placeholders.
pub fn voc_to_kitti(xml: &str) -> Result<String> {
    let annotation: VocAnnotation =
        quick_xml::de::from_str(xml).context("Failed to parse VOC annotation")?;

    let mut out = String::new();
    for object in &annotation.objects {
        let class: String = object.name.split_whitespace().collect();
        let b = &object.bndbox;
        let height = (b.ymax - b.ymin) / constants::KITTI_DIMENSION_SCALE;
        let width = (b.xmax - b.xmin) / constants::KITTI_DIMENSION_SCALE;

        let _ = writeln!(
            out,
            "{} 0.0 0 1.0 {} {} {} {} {} {} 0.1 1.0 0.0 1.0 0.0",
            class,
            kitti_number(b.xmin),
            kitti_number(b.ymin),
            kitti_number(b.xmax),
            kitti_number(b.ymax),
            kitti_number(height),
            kitti_number(width),
        );
    }

    Ok(out)
}

/// Writes `{stem}.txt` for one XML file into `output_dir`.
pub fn convert_file(xml_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let xml = fs::read_to_string(xml_path)
        .with_context(|| format!("Failed to read {}", xml_path.display()))?;
    let kitti = voc_to_kitti(&xml).with_context(|| format!("in {}", xml_path.display()))?;

    let stem = xml_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let out_path = output_dir.join(format!("{}.{}", stem, constants::LABEL_EXTENSION));

    fs::write(&out_path, kitti)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    logger::debug(&format!("kitti: {} -> {}", xml_path.display(), out_path.display()));

    Ok(out_path)
}

/// Converts a single XML file, or every `.xml` file of a directory.
pub fn convert(input: &Path, output_dir: &Path) -> Result<usize> {
    file_utils::ensure_dir(output_dir)?;

    if input.is_dir() {
        let files = file_utils::list_files(input, "xml")?;
        for file in &files {
            convert_file(file, output_dir)?;
        }
        Ok(files.len())
    } else {
        convert_file(input, output_dir)?;
        Ok(1)
    }
}
