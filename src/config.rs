use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILENAME: &str = "indigo.toml";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub resources: ResourceConfig,
    pub classifier: ClassifierConfig,
    pub verdict: VerdictConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub bundle_dir: PathBuf,
    pub model: PathBuf,
    pub labels: PathBuf,
    pub samples: Vec<String>,
    pub sample_extension: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            bundle_dir: PathBuf::from("assets"),
            model: PathBuf::from("models").join("indigo_leaf_classifier.onnx"),
            labels: PathBuf::from("models").join("labels.txt"),
            samples: ["healthy_1", "healthy_2", "healthy_3", "rust_1", "rust_2", "rust_3"]
                .into_iter()
                .map(String::from)
                .collect(),
            sample_extension: "jpg".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    #[default]
    Nchw,
    Nhwc,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub input_size: u32,
    pub layout: TensorLayout,
    pub mean: [f32; 3],
    pub std: [f32; 3],
    pub intra_threads: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            input_size: 224,
            layout: TensorLayout::Nchw,
            mean: [0.0; 3],
            std: [1.0; 3],
            intra_threads: 2,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct VerdictConfig {
    pub disease_keywords: Vec<String>,
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            disease_keywords: vec!["rust".to_string()],
        }
    }
}

impl AppConfig {
    /// Loads `path` if given, else `indigo.toml` from the working directory
    /// when it exists, else the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILENAME);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    log::debug!("no {DEFAULT_CONFIG_FILENAME} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.classifier.input_size == 0 {
            anyhow::bail!("classifier.input_size must be greater than zero");
        }
        if self.classifier.std.iter().any(|s| *s == 0.0) {
            anyhow::bail!("classifier.std entries must be non-zero");
        }
        Ok(())
    }

    pub fn model_path(&self) -> PathBuf {
        self.resources.bundle_dir.join(&self.resources.model)
    }

    pub fn labels_path(&self) -> PathBuf {
        self.resources.bundle_dir.join(&self.resources.labels)
    }
}
