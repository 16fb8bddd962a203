#![allow(dead_code)]

use std::{
    path::Path,
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender, unbounded};
use image::{Rgb, RgbImage};
use indigo::{
    ClassificationError, ImageSample, Prediction,
    pipeline::{Classifier, SampleSource},
    session::ScanSession,
    types::Frame,
};

/// Answers with a fixed prediction.
pub struct Fixed {
    pub label: &'static str,
    pub probability: f32,
}

impl Classifier for Fixed {
    fn classify(&mut self, _frame: &Frame) -> Result<Prediction, ClassificationError> {
        Ok(Prediction::new(self.label, self.probability))
    }
}

/// Labels a leaf by its dominant colour: orange-red is rust, green is healthy.
pub struct ColourClassifier;

impl Classifier for ColourClassifier {
    fn classify(&mut self, frame: &Frame) -> Result<Prediction, ClassificationError> {
        let (mut red, mut green) = (0u64, 0u64);
        for px in frame.rgba.chunks_exact(4) {
            red += px[0] as u64;
            green += px[1] as u64;
        }
        if red > green {
            Ok(Prediction::new("Rust_Leaf", 0.873))
        } else {
            Ok(Prediction::new("Healthy", 0.95))
        }
    }
}

/// Blocks every classification until the test releases it.
pub struct Gated {
    pub release: Receiver<Result<Prediction, ClassificationError>>,
    pub started: Sender<()>,
}

impl Classifier for Gated {
    fn classify(&mut self, _frame: &Frame) -> Result<Prediction, ClassificationError> {
        let _ = self.started.send(());
        self.release
            .recv()
            .unwrap_or_else(|_| Err(ClassificationError::inference("gate closed")))
    }
}

pub struct GateControl {
    pub release: Sender<Result<Prediction, ClassificationError>>,
    pub started: Receiver<()>,
}

pub fn gated() -> (Gated, GateControl) {
    let (release_tx, release_rx) = unbounded();
    let (started_tx, started_rx) = unbounded();
    (
        Gated {
            release: release_rx,
            started: started_tx,
        },
        GateControl {
            release: release_tx,
            started: started_rx,
        },
    )
}

/// Hands out a pre-made sample, or an error.
pub struct Scripted(pub Result<ImageSample, ClassificationError>);

impl SampleSource for Scripted {
    fn capture(&mut self) -> Result<ImageSample, ClassificationError> {
        self.0.clone()
    }
}

pub fn leaf_sample() -> ImageSample {
    ImageSample::decoded(
        indigo::Provenance::LiveCapture {
            device: "test camera".into(),
        },
        Frame::from_rgba([40, 160, 60, 255].repeat(16), 4, 4),
    )
}

pub fn write_jpeg(path: &Path, colour: [u8; 3]) {
    RgbImage::from_pixel(16, 12, Rgb(colour))
        .save(path)
        .expect("write test jpeg");
}

/// Polls the session until `done` holds or five seconds pass.
pub fn poll_until(session: &mut ScanSession, done: impl Fn(&ScanSession) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        session.poll();
        if done(session) {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}
