use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every file under `directory` with one of `extensions`, sorted by path.
pub fn discover_images(directory: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if entry.file_type().is_file() {
            if let Some(ext) = path.extension() {
                let ext_lower = ext.to_string_lossy().to_lowercase();
                if extensions.iter().any(|e| e.to_lowercase() == ext_lower) {
                    images.push(path.to_path_buf());
                }
            }
        }
    }

    // Sort by path for consistent ordering
    images.sort();

    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[test]
    fn test_discover_images() {
        let dir = tempdir().unwrap();

        fs::create_dir(dir.path().join("P1")).unwrap();
        File::create(dir.path().join("P1/B0_20141003_121214E.JPG")).unwrap();
        File::create(dir.path().join("P1/B0_20141003_121314E.jpg")).unwrap();
        File::create(dir.path().join("P1/notes.txt")).unwrap();

        fs::create_dir_all(dir.path().join("P2/extra")).unwrap();
        File::create(dir.path().join("P2/extra/B0_20141003_121214E.jpeg")).unwrap();

        let extensions = vec!["jpg".to_string(), "jpeg".to_string()];
        let images = discover_images(dir.path(), &extensions);

        assert_eq!(images.len(), 3);
        assert!(images.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
