#[cfg(feature = "camera-nokhwa")]
pub mod camera;
pub mod classifier;
#[cfg(feature = "camera-nokhwa")]
pub mod rgba_converter;
pub mod sample;

// Re-exports for convenience
#[cfg(feature = "camera-nokhwa")]
pub use camera::{CameraDevice, CameraSample, available_cameras};
pub use classifier::{Classifier, ClassifierHandle, ClassifyReply, Ticket, start_classifier};
pub use sample::{BundledSamples, FileSample, SampleSource};
