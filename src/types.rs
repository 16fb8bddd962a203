use std::{fmt, path::PathBuf, sync::Arc};

#[derive(Clone, Debug)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn from_rgba(rgba: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            rgba,
            width,
            height,
        }
    }
}

/// Where an [`ImageSample`] came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provenance {
    Bundled { name: String },
    File { path: PathBuf },
    LiveCapture { device: String },
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Bundled { name } => write!(f, "bundled sample {name}"),
            Provenance::File { path } => write!(f, "file {}", path.display()),
            Provenance::LiveCapture { device } => write!(f, "camera {device}"),
        }
    }
}

#[derive(Clone, Debug)]
pub enum SamplePayload {
    /// Encoded image file contents, decoded by the classifier worker.
    Encoded(Arc<[u8]>),
    /// Already decoded pixels, as delivered by a camera.
    Decoded(Arc<Frame>),
}

/// A captured leaf photo. Cheap to clone; the payload is shared and never
/// mutated after capture.
#[derive(Clone, Debug)]
pub struct ImageSample {
    pub provenance: Provenance,
    pub payload: SamplePayload,
}

impl ImageSample {
    pub fn encoded(provenance: Provenance, bytes: Vec<u8>) -> Self {
        Self {
            provenance,
            payload: SamplePayload::Encoded(bytes.into()),
        }
    }

    pub fn decoded(provenance: Provenance, frame: Frame) -> Self {
        Self {
            provenance,
            payload: SamplePayload::Decoded(Arc::new(frame)),
        }
    }
}

/// Raw output of a [`crate::pipeline::Classifier`]: the top label and its
/// probability in `0..=1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// `round(p * 100)` clamped to `0..=100`; non-finite input reads as zero.
pub fn whole_percent(probability: f32) -> u8 {
    if probability.is_finite() {
        (probability * 100.0).round().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

/// A completed classification. Only ever built from a successful inference.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationResult {
    label: String,
    probability: f32,
}

impl ClassificationResult {
    pub fn from_prediction(prediction: Prediction) -> Self {
        let probability = if prediction.probability.is_finite() {
            prediction.probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            label: prediction.label,
            probability,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Model probability in `0.0..=1.0`.
    pub fn probability(&self) -> f32 {
        self.probability
    }

    /// Confidence in `0.0..=100.0`.
    pub fn confidence(&self) -> f32 {
        self.probability * 100.0
    }

    /// Confidence rounded to a whole percent, as shown to the user.
    pub fn confidence_percent(&self) -> u8 {
        whole_percent(self.probability)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Healthy,
    Diseased,
}

impl Verdict {
    pub fn is_diseased(&self) -> bool {
        matches!(self, Verdict::Diseased)
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Verdict::Healthy => "Healthy Leaf",
            Verdict::Diseased => "Disease Detected",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Verdict::Healthy => "✅",
            Verdict::Diseased => "⚠️",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Verdict::Healthy => {
                "This leaf looks healthy! Keep monitoring regularly to catch any issues early."
            }
            Verdict::Diseased => {
                "This leaf shows signs of Coffee Leaf Rust. Quarantine the plant and apply a copper-based fungicide immediately."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_clamps_out_of_range_probabilities() {
        let high = ClassificationResult::from_prediction(Prediction::new("Healthy", 1.7));
        assert_eq!(high.confidence_percent(), 100);

        let low = ClassificationResult::from_prediction(Prediction::new("Healthy", -0.2));
        assert_eq!(low.confidence_percent(), 0);

        let nan = ClassificationResult::from_prediction(Prediction::new("Healthy", f32::NAN));
        assert_eq!(nan.confidence_percent(), 0);
    }

    #[test]
    fn confidence_rounds_to_nearest_percent() {
        let result = ClassificationResult::from_prediction(Prediction::new("Rust_Leaf", 0.873));
        assert_eq!(result.confidence_percent(), 87);
        assert_eq!(result.label(), "Rust_Leaf");

        let result = ClassificationResult::from_prediction(Prediction::new("Healthy", 0.996));
        assert_eq!(result.confidence_percent(), 100);
    }

    #[test]
    fn whole_percent_backs_the_result_percent() {
        assert_eq!(whole_percent(0.873), 87);
        assert_eq!(whole_percent(f32::NAN), 0);
        assert_eq!(whole_percent(-3.0), 0);
        let result = ClassificationResult::from_prediction(Prediction::new("Healthy", 0.95));
        assert_eq!(result.confidence_percent(), whole_percent(result.probability()));
    }
}
