//! # Estilizar: Multi-Style Transfer Training Pipeline
//!
//! Estilizar trains a single feed-forward image-transformation network to
//! apply one of several fixed artistic styles to arbitrary content images.
//! One optimizer step draws a content batch, rotates to the next configured
//! style, generates a stylized batch, scores it with a fixed perceptual
//! scorer, and backpropagates the weighted content/style loss through the
//! transfer network only.
//!
//! ## Architecture
//!
//! - **codec**: image I/O and the fixed 256x256 normalised tensor transform
//! - **data**: shuffled content streaming and the style catalog
//! - **model**: transfer / perceptual-scorer seams plus reference implementations
//! - **optim**: Adam with device-selected update kernels
//! - **train**: run identity, style rotation, stats persistence, and the
//!   training orchestrator
//! - **io**: JSON parameter snapshots

pub mod codec;
pub mod data;
pub mod device;
pub mod io;
pub mod model;
pub mod optim;
pub mod train;

pub mod error;

// Re-export commonly used types
pub use codec::ImageTensor;
pub use device::Device;
pub use error::{Error, Result};
pub use train::{RunReport, TrainOptions, TrainingOrchestrator};
