use fast_image_resize as fir;
use rayon::prelude::*;

use crate::{
    config::{ClassifierConfig, TensorLayout},
    error::ClassificationError,
    types::{Frame, ImageSample, Prediction, SamplePayload},
};

use std::sync::Arc;

/// Model input ready to be wrapped in a runtime tensor.
#[derive(Clone, Debug)]
pub struct InputTensor {
    pub data: Vec<f32>,
    pub shape: [usize; 4],
}

pub fn decode_sample(sample: &ImageSample) -> Result<Arc<Frame>, ClassificationError> {
    let frame = match &sample.payload {
        SamplePayload::Decoded(frame) => frame.clone(),
        SamplePayload::Encoded(bytes) => {
            let decoded = image::load_from_memory(bytes)
                .map_err(|err| ClassificationError::decode(format!("{}: {err}", sample.provenance)))?
                .to_rgba8();
            let (width, height) = decoded.dimensions();
            Arc::new(Frame::from_rgba(decoded.into_raw(), width, height))
        }
    };

    if frame.width == 0 || frame.height == 0 {
        return Err(ClassificationError::decode(format!(
            "{} has no pixels",
            sample.provenance
        )));
    }
    Ok(frame)
}

/// Resizes the frame to `input_size` square, stretching it to fill (no
/// letterbox), then normalises each channel as `(v / 255 - mean) / std`.
pub fn prepare_frame(
    frame: &Frame,
    config: &ClassifierConfig,
) -> Result<InputTensor, ClassificationError> {
    let expected_len = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.rgba.len() != expected_len || expected_len == 0 {
        return Err(ClassificationError::decode(format!(
            "frame buffer size mismatch: got {}, expected {}",
            frame.rgba.len(),
            expected_len
        )));
    }

    let size = config.input_size;
    let src_image = fir::images::Image::from_vec_u8(
        frame.width,
        frame.height,
        frame.rgba.clone(),
        fir::PixelType::U8x4,
    )
    .map_err(ClassificationError::decode)?;
    let mut dst_image = fir::images::Image::new(size, size, fir::PixelType::U8x4);
    let mut resizer = fir::Resizer::new();
    let resize_options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Interpolation(fir::FilterType::Bilinear));
    resizer
        .resize(&src_image, &mut dst_image, Some(&resize_options))
        .map_err(|err| ClassificationError::inference(format!("resize failed: {err}")))?;
    let resized = dst_image.into_vec();

    let side = size as usize;
    let normalize = |value: u8, channel: usize| {
        (value as f32 / 255.0 - config.mean[channel]) / config.std[channel]
    };

    let (data, shape) = match config.layout {
        TensorLayout::Nhwc => {
            let data: Vec<f32> = resized
                .par_chunks_exact(4)
                .flat_map_iter(|px| {
                    [
                        normalize(px[0], 0),
                        normalize(px[1], 1),
                        normalize(px[2], 2),
                    ]
                })
                .collect();
            (data, [1, side, side, 3])
        }
        TensorLayout::Nchw => {
            let plane = side * side;
            let mut data = vec![0.0f32; plane * 3];
            data.par_chunks_mut(plane)
                .enumerate()
                .for_each(|(channel, dst)| {
                    for (value, px) in dst.iter_mut().zip(resized.chunks_exact(4)) {
                        *value = normalize(px[channel], channel);
                    }
                });
            (data, [1, 3, side, side])
        }
    };

    Ok(InputTensor { data, shape })
}

/// Picks the highest score. Scores that do not already look like a
/// probability distribution are soft-maxed first.
pub fn top_prediction(scores: &[f32], labels: &[String]) -> Result<Prediction, ClassificationError> {
    if scores.is_empty() {
        return Err(ClassificationError::inference("no classification results"));
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(ClassificationError::inference(
            "model produced non-finite scores",
        ));
    }

    let probabilities = if is_distribution(scores) {
        scores.to_vec()
    } else {
        softmax(scores)
    };

    let (index, probability) = probabilities
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::MIN), |best, (idx, p)| if p > best.1 { (idx, p) } else { best });

    let label = labels
        .get(index)
        .filter(|label| !label.is_empty())
        .cloned()
        .unwrap_or_else(|| format!("class_{index}"));

    Ok(Prediction::new(label, probability.clamp(0.0, 1.0)))
}

/// A lone score in range is a sigmoid output, not a one-class distribution.
fn is_distribution(scores: &[f32]) -> bool {
    let in_range = scores.iter().all(|s| (0.0..=1.0).contains(s));
    if scores.len() == 1 {
        return in_range;
    }
    let sum: f32 = scores.iter().sum();
    in_range && (sum - 1.0).abs() <= 1e-3
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::MIN, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
