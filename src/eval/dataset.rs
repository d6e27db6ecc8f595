//! Walks a `root / dataset / category / file.wav` tree (`__main__.py`'s
//! dataset discovery loop), ignoring any directory whose name starts with
//! `.` and accepting only case-insensitive `.wav` files.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// One discovered cover file and the dataset/category it belongs to.
#[derive(Debug, Clone)]
pub struct DatasetFile {
    pub dataset: String,
    pub category: String,
    pub path: PathBuf,
    pub file_name: String,
}

fn visible_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if path.is_dir() && !name.starts_with('.') {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn wav_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("wav")) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Walks `root` for `dataset/category/*.wav` files, in `root`'s directory
/// order (§4.10).
pub fn discover(root: &Path) -> Result<Vec<DatasetFile>> {
    let mut out = Vec::new();
    for dataset_dir in visible_dirs(root)? {
        let dataset = dataset_dir.file_name().unwrap().to_string_lossy().into_owned();
        for category_dir in visible_dirs(&dataset_dir)? {
            let category = category_dir.file_name().unwrap().to_string_lossy().into_owned();
            for file in wav_files(&category_dir)? {
                let file_name = file.file_name().unwrap().to_string_lossy().into_owned();
                out.push(DatasetFile { dataset: dataset.clone(), category: category.clone(), path: file, file_name });
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_nested_wav_files_and_skips_dotdirs() {
        let root = std::env::temp_dir().join(format!("stego_dataset_test_{}", std::process::id()));
        let cat_dir = root.join("setA").join("catX");
        std::fs::create_dir_all(&cat_dir).unwrap();
        std::fs::write(cat_dir.join("a.WAV"), b"x").unwrap();
        std::fs::write(cat_dir.join("notes.txt"), b"x").unwrap();
        let hidden = root.join(".hidden").join("cat");
        std::fs::create_dir_all(&hidden).unwrap();
        std::fs::write(hidden.join("b.wav"), b"x").unwrap();

        let files = discover(&root).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].dataset, "setA");
        assert_eq!(files[0].category, "catX");
        assert_eq!(files[0].file_name, "a.WAV");

        std::fs::remove_dir_all(&root).unwrap();
    }
}
