use std::path::{Path, PathBuf};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    config::ResourceConfig,
    error::{ClassificationError, ResourceKind},
    resources::{read_resource, sample_path},
    types::{ImageSample, Provenance},
};

/// Produces the leaf photo for a scan.
pub trait SampleSource {
    fn capture(&mut self) -> Result<ImageSample, ClassificationError>;
}

/// Picks one of a fixed set of images shipped in the bundle directory.
pub struct BundledSamples {
    bundle_dir: PathBuf,
    names: Vec<String>,
    extension: String,
    rng: StdRng,
}

impl BundledSamples {
    pub fn new(bundle_dir: impl Into<PathBuf>, names: Vec<String>, extension: &str) -> Self {
        Self {
            bundle_dir: bundle_dir.into(),
            names,
            extension: extension.to_string(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn from_config(config: &ResourceConfig) -> Self {
        Self::new(
            config.bundle_dir.clone(),
            config.samples.clone(),
            &config.sample_extension,
        )
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl SampleSource for BundledSamples {
    fn capture(&mut self) -> Result<ImageSample, ClassificationError> {
        let Some(name) = self.names.choose(&mut self.rng).cloned() else {
            return Err(ClassificationError::missing(
                ResourceKind::Sample,
                &self.bundle_dir,
            ));
        };
        let path = sample_path(&self.bundle_dir, &name, &self.extension);
        let bytes = read_resource(ResourceKind::Sample, &path)?;
        log::debug!("picked bundled sample {name} ({} bytes)", bytes.len());
        Ok(ImageSample::encoded(Provenance::Bundled { name }, bytes))
    }
}

/// Always captures the same image file.
pub struct FileSample {
    path: PathBuf,
}

impl FileSample {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SampleSource for FileSample {
    fn capture(&mut self) -> Result<ImageSample, ClassificationError> {
        let bytes = read_resource(ResourceKind::Sample, &self.path)?;
        Ok(ImageSample::encoded(
            Provenance::File {
                path: self.path.clone(),
            },
            bytes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SamplePayload;
    use std::fs;

    #[test]
    fn picks_only_from_the_named_samples() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("rust_1.jpg"), b"jpeg bytes").unwrap();

        let mut source =
            BundledSamples::new(dir.path(), vec!["rust_1".to_string()], "jpg").with_seed(3);
        let sample = source.capture().unwrap();
        assert_eq!(
            sample.provenance,
            Provenance::Bundled {
                name: "rust_1".into()
            }
        );
        assert!(matches!(sample.payload, SamplePayload::Encoded(ref b) if &b[..] == b"jpeg bytes"));
    }

    #[test]
    fn missing_sample_is_resource_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = BundledSamples::new(dir.path(), vec!["healthy_2".to_string()], "jpg");
        assert_eq!(
            source.capture().unwrap_err(),
            ClassificationError::missing(ResourceKind::Sample, dir.path().join("healthy_2.jpg"))
        );
    }

    #[test]
    fn empty_sample_list_is_resource_missing() {
        let mut source = BundledSamples::new("assets", Vec::new(), "jpg");
        assert!(matches!(
            source.capture(),
            Err(ClassificationError::ResourceMissing {
                kind: ResourceKind::Sample,
                ..
            })
        ));
    }

    #[test]
    fn file_sample_tags_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        fs::write(&path, b"png").unwrap();
        let sample = FileSample::new(&path).capture().unwrap();
        assert_eq!(sample.provenance, Provenance::File { path });
    }
}
