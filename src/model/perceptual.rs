//! Fixed perceptual-loss scorer seam

use crate::codec::{ImageTensor, CHANNELS};
use crate::{Error, Result};
use ndarray::Axis;

/// Raw (unweighted) losses for one step plus their gradients with respect
/// to the generated batch.
pub struct PerceptualScore {
    pub content_loss: f32,
    pub style_loss: f32,
    pub content_grad: ImageTensor,
    pub style_grad: ImageTensor,
}

/// Capability interface for the fixed (non-trained) loss network.
///
/// Index-stable: the per-style targets are computed once at construction, so
/// the same slot always scores against the same target. Both losses are
/// non-negative and differentiable with respect to the generated batch only.
pub trait PerceptualScorer {
    fn score(
        &self,
        content: &ImageTensor,
        generated: &ImageTensor,
        slot: usize,
    ) -> Result<PerceptualScore>;

    fn style_count(&self) -> usize;
}

#[derive(Debug, Clone, Copy)]
struct ChannelMoments {
    mean: [f32; CHANNELS],
    var: [f32; CHANNELS],
}

/// Reference scorer matching per-channel first and second moments.
///
/// The content term is the pixel MSE between the generated and content
/// batches. The style term compares the generated batch's per-channel mean
/// and variance against fixed targets derived from the style set at
/// construction time. Both terms have exact closed-form gradients.
pub struct MomentMatchingScorer {
    targets: Vec<ChannelMoments>,
}

impl MomentMatchingScorer {
    /// Build the scorer from the normalised style set, slot order preserved.
    pub fn from_styles(styles: &[ImageTensor]) -> Result<Self> {
        if styles.is_empty() {
            return Err(Error::Config("style set is empty".into()));
        }
        let targets = styles.iter().map(channel_moments).collect();
        Ok(Self { targets })
    }
}

fn channel_moments(tensor: &ImageTensor) -> ChannelMoments {
    let mut mean = [0.0; CHANNELS];
    let mut var = [0.0; CHANNELS];
    for c in 0..CHANNELS {
        let channel = tensor.index_axis(Axis(1), c);
        let mu = channel.mean().unwrap_or(0.0);
        mean[c] = mu;
        var[c] = channel.mapv(|v| (v - mu).powi(2)).mean().unwrap_or(0.0);
    }
    ChannelMoments { mean, var }
}

impl PerceptualScorer for MomentMatchingScorer {
    fn score(
        &self,
        content: &ImageTensor,
        generated: &ImageTensor,
        slot: usize,
    ) -> Result<PerceptualScore> {
        if content.dim() != generated.dim() {
            let (b, c, h, w) = content.dim();
            let (gb, gc, gh, gw) = generated.dim();
            return Err(Error::ShapeMismatch {
                expected: vec![b, c, h, w],
                got: vec![gb, gc, gh, gw],
            });
        }
        let target = self.targets.get(slot).ok_or(Error::StyleIndexOutOfRange {
            index: slot,
            available: self.targets.len(),
        })?;

        let dim = generated.dim();
        let n = generated.len() as f32;
        let diff = generated - content;
        let content_loss = diff.mapv(|v| v * v).mean().unwrap_or(0.0);
        let content_grad = diff.mapv(|v| 2.0 * v / n);

        // Per channel: (mu - mu_target)^2 + (var - var_target)^2 with
        // d(mu)/dy_i = 1/m and d(var)/dy_i = 2 (y_i - mu) / m.
        let m = (dim.0 * dim.2 * dim.3) as f32;
        let mut style_loss = 0.0;
        let mut style_grad = ImageTensor::zeros(dim);
        for c in 0..CHANNELS {
            let channel = generated.index_axis(Axis(1), c);
            let mu = channel.mean().unwrap_or(0.0);
            let var = channel.mapv(|v| (v - mu).powi(2)).mean().unwrap_or(0.0);
            let d_mu = mu - target.mean[c];
            let d_var = var - target.var[c];
            style_loss += d_mu * d_mu + d_var * d_var;

            let grad_c = channel.mapv(|v| 2.0 * d_mu / m + 4.0 * d_var * (v - mu) / m);
            style_grad.index_axis_mut(Axis(1), c).assign(&grad_c);
        }

        Ok(PerceptualScore {
            content_loss,
            style_loss,
            content_grad,
            style_grad,
        })
    }

    fn style_count(&self) -> usize {
        self.targets.len()
    }
}
