use std::{path::PathBuf, thread};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use indigo::{
    config::AppConfig,
    interpreter::DiseaseKeywords,
    journey::Journey,
    pipeline::{BundledSamples, ClassifierHandle, FileSample, SampleSource, start_classifier},
    ui::AppView,
    voice::LogVoice,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Indigo - offline coffee leaf health scanner")]
struct Cli {
    /// Config file (defaults to ./indigo.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture one leaf and classify it
    Scan {
        /// Classify this image instead of a random bundled sample
        #[arg(long, conflicts_with = "camera")]
        image: Option<PathBuf>,
        /// Capture from the camera at this position (see `cameras`)
        #[arg(long)]
        camera: Option<usize>,
        /// Speak the result
        #[arg(long)]
        listen: bool,
    },
    /// Walk through the whole story, ending with a scan
    Journey {
        /// Jump straight from the welcome screen to the scanner
        #[arg(long)]
        scanner_only: bool,
        /// Classify this image at the scanner step
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Print the bundled model's inputs and outputs
    ModelInfo,
    /// List capture devices
    Cameras,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let keywords = DiseaseKeywords::new(&config.verdict.disease_keywords);

    match cli.command {
        Command::Scan {
            image,
            camera,
            listen,
        } => {
            let source = sample_source(&config, image, camera)?;
            let (classifier, _worker) = start_leaf_classifier(&config);
            let mut view = AppView::scanner(keywords, classifier, source, Box::new(LogVoice))
                .with_listen(listen);
            let report = view.run_scan()?;
            log::info!(
                "scan finished: {} {}%",
                report.result.label(),
                report.result.confidence_percent()
            );
        }
        Command::Journey {
            scanner_only,
            image,
        } => {
            let source = sample_source(&config, image, None)?;
            let (classifier, _worker) = start_leaf_classifier(&config);
            let mut journey = Journey::new(keywords);
            if scanner_only {
                journey.skip_to_scanner();
            }
            AppView::new(journey, classifier, source, Box::new(LogVoice)).run_journey()?;
        }
        Command::ModelInfo => print_model_info(&config)?,
        Command::Cameras => print_cameras()?,
    }

    Ok(())
}

fn sample_source(
    config: &AppConfig,
    image: Option<PathBuf>,
    camera: Option<usize>,
) -> Result<Box<dyn SampleSource>> {
    if let Some(path) = image {
        return Ok(Box::new(FileSample::new(path)));
    }
    if let Some(position) = camera {
        return camera_source(position);
    }
    Ok(Box::new(BundledSamples::from_config(&config.resources)))
}

#[cfg(feature = "camera-nokhwa")]
fn camera_source(position: usize) -> Result<Box<dyn SampleSource>> {
    let source = indigo::pipeline::CameraSample::by_position(position)
        .with_context(|| format!("failed to select camera {position}"))?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "camera-nokhwa"))]
fn camera_source(_position: usize) -> Result<Box<dyn SampleSource>> {
    anyhow::bail!("camera capture needs the camera-nokhwa feature")
}

#[cfg(feature = "onnx-ort")]
fn start_leaf_classifier(config: &AppConfig) -> (ClassifierHandle, thread::JoinHandle<()>) {
    let backend = indigo::pipeline::classifier::ort::OrtBackend::from_config(config);
    log::info!("starting leaf classifier: ort ({})", backend.model_path.display());
    start_classifier(move || backend.load())
}

#[cfg(not(feature = "onnx-ort"))]
fn start_leaf_classifier(_config: &AppConfig) -> (ClassifierHandle, thread::JoinHandle<()>) {
    enum Unavailable {}

    impl indigo::pipeline::Classifier for Unavailable {
        fn classify(
            &mut self,
            _frame: &indigo::types::Frame,
        ) -> Result<indigo::Prediction, indigo::ClassificationError> {
            match *self {}
        }
    }

    start_classifier(|| {
        Err::<Unavailable, _>(indigo::ClassificationError::inference(
            "built without an inference backend",
        ))
    })
}

#[cfg(feature = "onnx-ort")]
fn print_model_info(config: &AppConfig) -> Result<()> {
    let model_path = config.model_path();
    println!("Loading model: {}", model_path.display());
    let lines = indigo::pipeline::classifier::ort::describe_model(&model_path)
        .with_context(|| format!("failed to inspect {}", model_path.display()))?;
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

#[cfg(not(feature = "onnx-ort"))]
fn print_model_info(_config: &AppConfig) -> Result<()> {
    anyhow::bail!("model inspection needs the onnx-ort feature")
}

#[cfg(feature = "camera-nokhwa")]
fn print_cameras() -> Result<()> {
    let cameras = indigo::pipeline::available_cameras().context("failed to query cameras")?;
    if cameras.is_empty() {
        println!("No cameras found");
    }
    for (position, camera) in cameras.iter().enumerate() {
        println!("{position}: {}", camera.label);
    }
    Ok(())
}

#[cfg(not(feature = "camera-nokhwa"))]
fn print_cameras() -> Result<()> {
    anyhow::bail!("camera support needs the camera-nokhwa feature")
}
