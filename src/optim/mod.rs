//! Optimizers

mod adam;
mod optimizer;
pub(crate) mod simd;

pub use adam::Adam;
pub use optimizer::Optimizer;
