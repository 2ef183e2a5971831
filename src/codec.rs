//! Image codec: raster I/O and the fixed 256x256 normalised tensor transform
//!
//! Every image entering the pipeline goes through the same transform: decode,
//! resize to 256x256, scale to `[0, 1]`. Content batches and the style set
//! are additionally normalised with shared per-channel statistics before they
//! reach the perceptual scorer, so the two sides are always compared in the
//! same space.

use crate::{Error, Result};
use image::imageops::FilterType;
use ndarray::{Array4, Axis};
use std::path::Path;

/// Side length every image is resized to before entering the pipeline.
pub const TRANSFER_SIZE: usize = 256;

/// Channel count (RGB).
pub const CHANNELS: usize = 3;

/// A `[batch, channel, height, width]` image batch, values in `[0, 1]` on load.
pub type ImageTensor = Array4<f32>;

const NORM_MEAN: [f32; CHANNELS] = [0.485, 0.456, 0.406];
const NORM_STD: [f32; CHANNELS] = [0.229, 0.224, 0.225];

/// Load a single image as a `[1, 3, 256, 256]` tensor scaled to `[0, 1]`.
pub fn load_image_as_tensor(path: impl AsRef<Path>) -> Result<ImageTensor> {
    let img = image::open(path.as_ref())?
        .resize_exact(
            TRANSFER_SIZE as u32,
            TRANSFER_SIZE as u32,
            FilterType::Triangle,
        )
        .to_rgb8();

    let mut tensor = Array4::zeros((1, CHANNELS, TRANSFER_SIZE, TRANSFER_SIZE));
    for (x, y, pixel) in img.enumerate_pixels() {
        for c in 0..CHANNELS {
            tensor[[0, c, y as usize, x as usize]] = f32::from(pixel[c]) / 255.0;
        }
    }
    Ok(tensor)
}

/// Save the first element of a batch as a raster image, clamping to `[0, 1]`.
pub fn save_tensor_as_image(tensor: &ImageTensor, path: impl AsRef<Path>) -> Result<()> {
    let (batch, channels, height, width) = tensor.dim();
    if batch == 0 || channels != CHANNELS {
        return Err(Error::ShapeMismatch {
            expected: vec![1, CHANNELS, height, width],
            got: vec![batch, channels, height, width],
        });
    }

    let mut img = image::RgbImage::new(width as u32, height as u32);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        for c in 0..CHANNELS {
            let v = tensor[[0, c, y as usize, x as usize]].clamp(0.0, 1.0);
            pixel[c] = (v * 255.0).round() as u8;
        }
    }
    img.save(path.as_ref())?;
    Ok(())
}

/// Apply the fixed per-channel normalisation shared by content batches,
/// generated batches and the style set.
pub fn normalise_batch(batch: &ImageTensor) -> ImageTensor {
    debug_assert_eq!(batch.dim().1, CHANNELS);
    let mut out = batch.clone();
    for (c, mut channel) in out.axis_iter_mut(Axis(1)).enumerate() {
        channel.mapv_inplace(|v| (v - NORM_MEAN[c]) / NORM_STD[c]);
    }
    out
}

/// Chain-rule factor for gradients computed against a normalised batch:
/// d(normalised)/d(raw) is 1/std per channel.
pub fn normalise_batch_grad(grad: &ImageTensor) -> ImageTensor {
    debug_assert_eq!(grad.dim().1, CHANNELS);
    let mut out = grad.clone();
    for (c, mut channel) in out.axis_iter_mut(Axis(1)).enumerate() {
        channel.mapv_inplace(|v| v / NORM_STD[c]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array4;

    #[test]
    fn save_then_load_round_trips_shape_and_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");

        let mut tensor = Array4::zeros((1, CHANNELS, 8, 8));
        tensor.fill(0.5);
        save_tensor_as_image(&tensor, &path).unwrap();

        let loaded = load_image_as_tensor(&path).unwrap();
        assert_eq!(loaded.dim(), (1, CHANNELS, TRANSFER_SIZE, TRANSFER_SIZE));
        for &v in loaded.iter() {
            assert!((0.0..=1.0).contains(&v));
        }
        assert_relative_eq!(loaded[[0, 0, 0, 0]], 0.5, epsilon = 1.0 / 255.0);
    }

    #[test]
    fn save_rejects_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let tensor = Array4::zeros((0, CHANNELS, 4, 4));
        let err = save_tensor_as_image(&tensor, dir.path().join("x.png"));
        assert!(err.is_err());
    }

    #[test]
    fn normalise_applies_channel_statistics() {
        let mut tensor = Array4::zeros((1, CHANNELS, 2, 2));
        tensor.fill(0.485);
        let normed = normalise_batch(&tensor);
        // Channel 0 mean matches the fill value exactly.
        assert_relative_eq!(normed[[0, 0, 0, 0]], 0.0, epsilon = 1e-6);
        assert!(normed[[0, 1, 0, 0]] > 0.0);
        assert!(normed[[0, 2, 0, 0]] > 0.0);
    }

    #[test]
    fn normalise_grad_is_inverse_std_scaling() {
        let mut grad = Array4::zeros((1, CHANNELS, 1, 1));
        grad.fill(1.0);
        let scaled = normalise_batch_grad(&grad);
        assert_relative_eq!(scaled[[0, 0, 0, 0]], 1.0 / 0.229, epsilon = 1e-5);
        assert_relative_eq!(scaled[[0, 2, 0, 0]], 1.0 / 0.225, epsilon = 1e-5);
    }
}
