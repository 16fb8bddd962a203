use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ndarray::Array4;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use super::{Classifier, common};
use crate::{
    config::{AppConfig, ClassifierConfig},
    error::{ClassificationError, ResourceKind},
    resources::{ensure_resource_present, load_labels},
    types::{Frame, Prediction},
};

/// Paths and preprocessing for the bundled ONNX leaf model.
#[derive(Clone, Debug)]
pub struct OrtBackend {
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub classifier: ClassifierConfig,
}

impl OrtBackend {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model_path: config.model_path(),
            labels_path: config.labels_path(),
            classifier: config.classifier.clone(),
        }
    }

    pub fn load(&self) -> Result<OrtClassifier, ClassificationError> {
        ensure_resource_present(ResourceKind::Model, &self.model_path)?;
        let labels = load_labels(&self.labels_path)?;
        let session = build_session(&self.model_path, self.classifier.intra_threads)
            .map_err(|err| ClassificationError::inference(format!("{err:#}")))?;

        log::info!(
            "leaf classifier ORT backend ready using {} ({} labels)",
            self.model_path.display(),
            labels.len()
        );

        Ok(OrtClassifier {
            session,
            labels,
            config: self.classifier.clone(),
        })
    }
}

fn build_session(model_path: &Path, intra_threads: usize) -> Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(intra_threads)?
        .commit_from_file(model_path)
        .with_context(|| format!("failed to load ORT session from {}", model_path.display()))?;
    Ok(session)
}

pub struct OrtClassifier {
    session: Session,
    labels: Vec<String>,
    config: ClassifierConfig,
}

impl Classifier for OrtClassifier {
    fn classify(&mut self, frame: &Frame) -> Result<Prediction, ClassificationError> {
        let input = common::prepare_frame(frame, &self.config)?;
        let scores = self
            .run(input)
            .map_err(|err| ClassificationError::inference(format!("{err:#}")))?;
        common::top_prediction(&scores, &self.labels)
    }
}

impl OrtClassifier {
    fn run(&mut self, input: common::InputTensor) -> Result<Vec<f32>> {
        let [n, a, b, c] = input.shape;
        let array = Array4::<f32>::from_shape_vec((n, a, b, c), input.data)
            .context("failed to build input tensor")?;
        let tensor = Tensor::from_array(array)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .context("failed to run ORT session")?;

        if outputs.len() < 1 {
            anyhow::bail!("model returned no outputs");
        }

        let scores = outputs[0].try_extract_array::<f32>()?;
        Ok(scores.iter().copied().collect())
    }
}

/// Input and output signatures of the model at `model_path`, one per line.
pub fn describe_model(model_path: &Path) -> Result<Vec<String>> {
    let session = build_session(model_path, 1)?;
    let mut lines = vec!["Inputs:".to_string()];
    for (idx, input) in session.inputs.iter().enumerate() {
        lines.push(format!(
            "  {idx}: name=\"{}\" type={:?}",
            input.name, input.input_type
        ));
    }
    lines.push("Outputs:".to_string());
    for (idx, output) in session.outputs.iter().enumerate() {
        lines.push(format!(
            "  {idx}: name=\"{}\" type={:?}",
            output.name, output.output_type
        ));
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn backend(dir: &Path) -> OrtBackend {
        OrtBackend {
            model_path: dir.join("models").join("indigo_leaf_classifier.onnx"),
            labels_path: dir.join("models").join("labels.txt"),
            classifier: ClassifierConfig::default(),
        }
    }

    #[test]
    fn missing_model_is_reported_before_building_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend(dir.path());

        match backend.load() {
            Err(ClassificationError::ResourceMissing { kind, path }) => {
                assert_eq!(kind, ResourceKind::Model);
                assert_eq!(path, backend.model_path);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("loaded without a model file"),
        }
    }

    #[test]
    fn missing_labels_are_reported_before_building_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend(dir.path());
        fs::create_dir_all(dir.path().join("models")).unwrap();
        fs::write(&backend.model_path, b"not read before the labels").unwrap();

        match backend.load() {
            Err(ClassificationError::ResourceMissing { kind, path }) => {
                assert_eq!(kind, ResourceKind::Labels);
                assert_eq!(path, backend.labels_path);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("loaded without a labels file"),
        }
    }
}
