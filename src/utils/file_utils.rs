use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Regular files in `dir` with the given extension, sorted by path so every
/// run enumerates them in the same order.
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let files = sorted_files(dir)?
        .into_iter()
        .filter(|path| path.extension().map_or(false, |ext| ext == extension))
        .collect::<Vec<_>>();

    if files.is_empty() {
        anyhow::bail!("No files with extension '{}' found in '{}'", extension, dir.display());
    }

    Ok(files)
}

/// All regular files directly inside `dir`, sorted by path.
pub fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();

    files.sort();
    Ok(files)
}

pub fn ensure_dir(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    Ok(path.to_path_buf())
}

pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
    Ok(())
}

/// Extension of `path` including the leading dot, or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["2_crop.mp4", "10_crop.mp4", "1_crop.mp4", "readme.md"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.mp4")).unwrap();

        let files = list_files(dir.path(), "mp4").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["10_crop.mp4", "1_crop.mp4", "2_crop.mp4"]);
    }

    #[test]
    fn test_list_files_empty_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files(dir.path(), "mp4").is_err());
        assert!(list_files(&dir.path().join("missing"), "mp4").is_err());
    }

    #[test]
    fn test_dotted_extension() {
        assert_eq!(dotted_extension(Path::new("a/b.jpg")), ".jpg");
        assert_eq!(dotted_extension(Path::new("a/b")), "");
    }
}
