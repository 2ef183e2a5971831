//! Trainable style-conditioned transfer network seam

use super::Param;
use crate::codec::{ImageTensor, CHANNELS};
use crate::{Error, Result};
use ndarray::{Array1, Axis};

/// Capability interface for the trainable transfer network.
///
/// Conditioning on the rotation slot selects style-specific parameters while
/// the remaining parameters are shared across all styles. `backward` uses
/// state cached by the most recent `forward` call and accumulates gradients
/// into the parameters returned by `params_mut`.
pub trait TransferModel {
    /// Generate a batch of the same shape as `content`, conditioned on `slot`.
    fn forward(&mut self, content: &ImageTensor, slot: usize) -> Result<ImageTensor>;

    /// Backpropagate `grad_output` (gradient of the loss with respect to the
    /// generated batch) into the parameter gradients.
    fn backward(&mut self, grad_output: &ImageTensor) -> Result<()>;

    fn params(&self) -> &[Param];

    fn params_mut(&mut self) -> &mut [Param];

    /// Number of styles this model is conditioned for.
    fn style_count(&self) -> usize;

    /// Switch between train and eval mode. Only train mode is used by the
    /// orchestrator.
    fn set_train(&mut self, train: bool);
}

struct ForwardCache {
    input: ImageTensor,
    slot: usize,
}

/// Reference transfer network: a shared per-channel gain around per-style
/// per-channel scale and bias conditioning.
///
/// `y[c] = gain[c] * (scale[slot][c] * x[c] + bias[slot][c])`
///
/// Small enough to train in tests yet exercises the full contract: shared
/// weights, style conditioning and an exact closed-form backward pass.
pub struct ChannelAffineTransfer {
    params: Vec<Param>,
    style_count: usize,
    training: bool,
    cache: Option<ForwardCache>,
}

impl ChannelAffineTransfer {
    const GAIN: usize = 0;

    pub fn new(style_count: usize) -> Self {
        let mut params = Vec::with_capacity(1 + 2 * style_count);
        params.push(Param::ones(CHANNELS)); // shared gain
        for _ in 0..style_count {
            params.push(Param::ones(CHANNELS)); // per-style scale
            params.push(Param::zeros(CHANNELS)); // per-style bias
        }
        Self {
            params,
            style_count,
            training: false,
            cache: None,
        }
    }

    fn scale_index(slot: usize) -> usize {
        1 + 2 * slot
    }

    fn bias_index(slot: usize) -> usize {
        2 + 2 * slot
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        if slot >= self.style_count {
            return Err(Error::StyleIndexOutOfRange {
                index: slot,
                available: self.style_count,
            });
        }
        Ok(())
    }
}

impl TransferModel for ChannelAffineTransfer {
    fn forward(&mut self, content: &ImageTensor, slot: usize) -> Result<ImageTensor> {
        self.check_slot(slot)?;
        let gain = self.params[Self::GAIN].data().clone();
        let scale = self.params[Self::scale_index(slot)].data().clone();
        let bias = self.params[Self::bias_index(slot)].data().clone();

        let mut out = content.clone();
        for (c, mut channel) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (g, w, b) = (gain[c], scale[c], bias[c]);
            channel.mapv_inplace(|v| g * (w * v + b));
        }

        if self.training {
            self.cache = Some(ForwardCache {
                input: content.clone(),
                slot,
            });
        }
        Ok(out)
    }

    fn backward(&mut self, grad_output: &ImageTensor) -> Result<()> {
        let cache = self
            .cache
            .take()
            .ok_or_else(|| Error::BackwardFailed("no forward pass cached".into()))?;
        if grad_output.dim() != cache.input.dim() {
            let (b, c, h, w) = cache.input.dim();
            let (gb, gc, gh, gw) = grad_output.dim();
            return Err(Error::ShapeMismatch {
                expected: vec![b, c, h, w],
                got: vec![gb, gc, gh, gw],
            });
        }

        let slot = cache.slot;
        let gain = self.params[Self::GAIN].data().clone();
        let scale = self.params[Self::scale_index(slot)].data().clone();
        let bias = self.params[Self::bias_index(slot)].data().clone();

        let mut d_gain = Array1::zeros(CHANNELS);
        let mut d_scale = Array1::zeros(CHANNELS);
        let mut d_bias = Array1::zeros(CHANNELS);
        for c in 0..CHANNELS {
            let x_c = cache.input.index_axis(Axis(1), c);
            let g_c = grad_output.index_axis(Axis(1), c);

            d_gain[c] = g_c
                .iter()
                .zip(x_c.iter())
                .map(|(&g, &x)| g * (scale[c] * x + bias[c]))
                .sum();
            d_scale[c] = gain[c]
                * g_c
                    .iter()
                    .zip(x_c.iter())
                    .map(|(&g, &x)| g * x)
                    .sum::<f32>();
            d_bias[c] = gain[c] * g_c.sum();
        }

        self.params[Self::GAIN].accumulate_grad(d_gain);
        self.params[Self::scale_index(slot)].accumulate_grad(d_scale);
        self.params[Self::bias_index(slot)].accumulate_grad(d_bias);
        Ok(())
    }

    fn params(&self) -> &[Param] {
        &self.params
    }

    fn params_mut(&mut self) -> &mut [Param] {
        &mut self.params
    }

    fn style_count(&self) -> usize {
        self.style_count
    }

    fn set_train(&mut self, train: bool) {
        self.training = train;
        if !train {
            self.cache = None;
        }
    }
}
