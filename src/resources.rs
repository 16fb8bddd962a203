use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::error::{ClassificationError, ResourceKind};

/// Fails with `ResourceMissing` when `path` is not a file on disk.
pub fn ensure_resource_present(kind: ResourceKind, path: &Path) -> Result<(), ClassificationError> {
    if path.is_file() {
        Ok(())
    } else {
        log::warn!("{kind} not found at {}", path.display());
        Err(ClassificationError::missing(kind, path))
    }
}

pub fn read_resource(kind: ResourceKind, path: &Path) -> Result<Vec<u8>, ClassificationError> {
    fs::read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => ClassificationError::missing(kind, path),
        _ => ClassificationError::decode(format!("failed to read {}: {err}", path.display())),
    })
}

pub fn sample_path(bundle_dir: &Path, name: &str, extension: &str) -> PathBuf {
    bundle_dir.join(format!("{name}.{extension}"))
}

/// Reads a labels file. Line `i` names output class `i`, so every line
/// counts, blank ones included; only trailing blank lines are dropped.
pub fn load_labels(path: &Path) -> Result<Vec<String>, ClassificationError> {
    let raw = read_resource(ResourceKind::Labels, path)?;
    let text = String::from_utf8(raw).map_err(|err| {
        ClassificationError::decode(format!("labels file {} is not UTF-8: {err}", path.display()))
    })?;
    Ok(parse_labels(&text))
}

pub fn parse_labels(text: &str) -> Vec<String> {
    let mut labels: Vec<String> = text.lines().map(|line| line.trim().to_string()).collect();
    while labels.last().is_some_and(|label| label.is_empty()) {
        labels.pop();
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_keep_their_line_position() {
        let labels = parse_labels("Healthy\n\nRust_Leaf\n\n\n");
        assert_eq!(labels, vec!["Healthy", "", "Rust_Leaf"]);
    }

    #[test]
    fn label_text_is_taken_verbatim() {
        let labels = parse_labels("2019 Harvest\n0: Healthy\n# Rust_Leaf\r\n");
        assert_eq!(labels, vec!["2019 Harvest", "0: Healthy", "# Rust_Leaf"]);
    }

    #[test]
    fn missing_files_map_to_resource_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");

        assert_eq!(
            load_labels(&path),
            Err(ClassificationError::missing(ResourceKind::Labels, &path))
        );
        assert_eq!(
            ensure_resource_present(ResourceKind::Model, &path),
            Err(ClassificationError::missing(ResourceKind::Model, &path))
        );
    }

    #[test]
    fn builds_sample_paths_from_bundle() {
        assert_eq!(
            sample_path(Path::new("assets"), "rust_1", "jpg"),
            Path::new("assets/rust_1.jpg")
        );
    }
}
