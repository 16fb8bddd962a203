use anyhow::{Result, anyhow};
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    query,
    utils::{ApiBackend, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType},
};

use super::{rgba_converter, sample::SampleSource};
use crate::{
    error::ClassificationError,
    types::{Frame, ImageSample, Provenance},
};

// Cameras often return dark or partially exposed frames right after the
// stream opens.
const WARMUP_FRAMES: usize = 5;

// Some built-in cameras reject YUYV even though Nokhwa reports it.
const PREFERRED_PIXEL_FORMATS: &[FrameFormat] = &[
    FrameFormat::RAWRGB,
    FrameFormat::RAWBGR,
    FrameFormat::GRAY,
    FrameFormat::YUYV,
    FrameFormat::NV12,
    FrameFormat::MJPEG,
];

fn requested_formats() -> [RequestedFormat<'static>; 3] {
    [
        RequestedFormat::with_formats(
            RequestedFormatType::AbsoluteHighestResolution,
            PREFERRED_PIXEL_FORMATS,
        ),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
    ]
}

#[derive(Clone, Debug)]
pub struct CameraDevice {
    pub index: CameraIndex,
    pub label: String,
}

pub fn available_cameras() -> Result<Vec<CameraDevice>> {
    let cameras = query(ApiBackend::Auto)?;
    Ok(cameras
        .into_iter()
        .map(|info| CameraDevice {
            index: info.index().clone(),
            label: info.human_name(),
        })
        .collect())
}

fn build_camera(index: &CameraIndex) -> Result<Camera> {
    let mut last_err = None;

    for requested in requested_formats() {
        match Camera::new(index.clone(), requested) {
            Ok(mut camera) => match camera.open_stream() {
                Ok(()) => return Ok(camera),
                Err(err) => last_err = Some(err.into()),
            },
            Err(err) => last_err = Some(err.into()),
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("failed to open camera with any supported format")))
}

/// Grabs one still per capture from a live camera. The stream is opened for
/// each capture and closed again, so the camera light is only on while
/// snapping.
pub struct CameraSample {
    device: CameraDevice,
}

impl CameraSample {
    pub fn new(device: CameraDevice) -> Self {
        Self { device }
    }

    pub fn by_position(position: usize) -> Result<Self> {
        let cameras = available_cameras()?;
        let device = cameras
            .into_iter()
            .nth(position)
            .ok_or_else(|| anyhow!("no camera at position {position}"))?;
        Ok(Self::new(device))
    }

    fn snap(&self) -> Result<Frame, ClassificationError> {
        let label = &self.device.label;
        let mut camera = build_camera(&self.device.index)
            .map_err(|err| ClassificationError::capture(label, format!("{err:#}")))?;
        let mut latest = None;
        for _ in 0..WARMUP_FRAMES {
            match camera.frame() {
                Ok(buffer) => latest = Some(buffer),
                Err(err) => log::warn!("camera frame read failed: {err:?}"),
            }
        }
        if let Err(err) = camera.stop_stream() {
            log::warn!("failed to stop camera stream: {err:?}");
        }

        let buffer =
            latest.ok_or_else(|| ClassificationError::capture(label, "camera delivered no frames"))?;
        rgba_converter::camera_buffer_to_frame(&buffer)
            .map_err(|err| ClassificationError::decode(format!("{err:#}")))
    }
}

impl SampleSource for CameraSample {
    fn capture(&mut self) -> Result<ImageSample, ClassificationError> {
        let frame = self.snap()?;
        Ok(ImageSample::decoded(
            Provenance::LiveCapture {
                device: self.device.label.clone(),
            },
            frame,
        ))
    }
}
