//! Trainable parameter: flat data plus an accumulated gradient
//!
//! The backward pass is owned by the model implementations, so a parameter
//! only needs storage for its gradient, not a tape.

use ndarray::Array1;

#[derive(Clone, Debug)]
pub struct Param {
    data: Array1<f32>,
    grad: Option<Array1<f32>>,
}

impl Param {
    pub fn new(data: Array1<f32>) -> Self {
        Self { data, grad: None }
    }

    pub fn from_vec(data: Vec<f32>) -> Self {
        Self::new(Array1::from(data))
    }

    pub fn zeros(len: usize) -> Self {
        Self::new(Array1::zeros(len))
    }

    pub fn ones(len: usize) -> Self {
        Self::new(Array1::ones(len))
    }

    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    /// Gradient accumulated since the last `zero_grad`, if any.
    pub fn grad(&self) -> Option<&Array1<f32>> {
        self.grad.as_ref()
    }

    pub fn set_grad(&mut self, grad: Array1<f32>) {
        self.grad = Some(grad);
    }

    /// Add `grad` to the stored gradient (used when a parameter contributes
    /// to the output through more than one path).
    pub fn accumulate_grad(&mut self, grad: Array1<f32>) {
        match self.grad.as_mut() {
            Some(existing) => *existing = &*existing + &grad,
            None => self.grad = Some(grad),
        }
    }

    pub fn zero_grad(&mut self) {
        self.grad = None;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
