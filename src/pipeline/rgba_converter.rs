use anyhow::{Result, anyhow, ensure};
use nokhwa::{Buffer, utils::FrameFormat};
use rayon::prelude::*;
use yuv::{
    YuvBiPlanarImage, YuvConversionMode, YuvPackedImage, YuvRange, YuvStandardMatrix,
    yuv_nv12_to_rgba, yuyv422_to_rgba,
};
use zune_jpeg::{
    JpegDecoder,
    zune_core::{bytestream::ZCursor, colorspace::ColorSpace, options::DecoderOptions},
};

use crate::types::Frame;

/// Converts whatever pixel format the camera delivered into an RGBA frame.
pub fn camera_buffer_to_frame(buffer: &Buffer) -> Result<Frame> {
    let resolution = buffer.resolution();
    let (width, height) = (resolution.width_x, resolution.height_y);
    let data = buffer.buffer();
    let pixels = width as usize * height as usize;

    let rgba = match buffer.source_frame_format() {
        FrameFormat::NV12 => {
            ensure!(
                data.len() >= pixels + pixels / 2,
                "NV12 buffer too small: got {}, expected {}",
                data.len(),
                pixels + pixels / 2
            );
            let mut rgba = vec![0u8; pixels * 4];
            let image = YuvBiPlanarImage {
                y_plane: &data[..pixels],
                y_stride: width,
                uv_plane: &data[pixels..pixels + pixels / 2],
                uv_stride: width,
                width,
                height,
            };
            yuv_nv12_to_rgba(
                &image,
                &mut rgba,
                width * 4,
                YuvRange::Full,
                YuvStandardMatrix::Bt709,
                YuvConversionMode::Balanced,
            )
            .map_err(|err| anyhow!("NV12→RGBA failed: {err:?}"))?;
            rgba
        }
        FrameFormat::YUYV => {
            ensure!(
                data.len() >= pixels * 2,
                "YUYV buffer too small: got {}, expected {}",
                data.len(),
                pixels * 2
            );
            let mut rgba = vec![0u8; pixels * 4];
            let packed = YuvPackedImage {
                yuy: data,
                yuy_stride: width * 2,
                width,
                height,
            };
            yuyv422_to_rgba(
                &packed,
                &mut rgba,
                width * 4,
                YuvRange::Full,
                YuvStandardMatrix::Bt709,
            )
            .map_err(|err| anyhow!("YUYV422→RGBA failed: {err:?}"))?;
            rgba
        }
        FrameFormat::MJPEG => {
            let options = DecoderOptions::default().jpeg_set_out_colorspace(ColorSpace::RGBA);
            let mut decoder = JpegDecoder::new_with_options(ZCursor::new(data), options);
            let rgba = decoder
                .decode()
                .map_err(|err| anyhow!("MJPEG decode failed: {err:?}"))?;
            ensure!(
                rgba.len() >= pixels * 4,
                "MJPEG decode produced too few bytes: got {}, expected {}",
                rgba.len(),
                pixels * 4
            );
            rgba
        }
        FrameFormat::RAWRGB => expand_channels(data, pixels, 3, |src| [src[0], src[1], src[2]])?,
        FrameFormat::RAWBGR => expand_channels(data, pixels, 3, |src| [src[2], src[1], src[0]])?,
        FrameFormat::GRAY => expand_channels(data, pixels, 1, |src| [src[0], src[0], src[0]])?,
    };

    Ok(Frame::from_rgba(rgba, width, height))
}

fn expand_channels<F>(data: &[u8], pixels: usize, channels: usize, to_rgb: F) -> Result<Vec<u8>>
where
    F: Fn(&[u8]) -> [u8; 3] + Sync,
{
    ensure!(
        data.len() >= pixels * channels,
        "{channels}-channel buffer too small: got {}, expected {}",
        data.len(),
        pixels * channels
    );

    let mut rgba = vec![0u8; pixels * 4];
    rgba.par_chunks_mut(4)
        .zip(data.par_chunks_exact(channels))
        .for_each(|(dst, src)| {
            let [r, g, b] = to_rgb(src);
            dst.copy_from_slice(&[r, g, b, 255]);
        });
    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_bgr_and_gray() {
        let bgr = expand_channels(&[1, 2, 3], 1, 3, |s| [s[2], s[1], s[0]]).unwrap();
        assert_eq!(bgr, vec![3, 2, 1, 255]);

        let gray = expand_channels(&[9, 7], 2, 1, |s| [s[0], s[0], s[0]]).unwrap();
        assert_eq!(gray, vec![9, 9, 9, 255, 7, 7, 7, 255]);
    }

    #[test]
    fn short_buffers_are_rejected() {
        assert!(expand_channels(&[1, 2], 1, 3, |s| [s[0], s[1], s[2]]).is_err());
    }
}
