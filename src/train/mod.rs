//! Training orchestration
//!
//! The heart of the crate: run-identity allocation, the optimization loop
//! with deterministic style rotation, weighted perceptual losses, and
//! per-step stats persistence.
//!
//! # Example
//!
//! ```no_run
//! use estilizar::train::{ProgressCallback, TrainOptions, TrainingOrchestrator};
//!
//! let options = TrainOptions::new("data/train", "data/styles", "out/checkpoints", "out/stats")
//!     .with_num_parameter_updates(1000)
//!     .with_style_idxs(vec![0, 3]);
//!
//! let mut orchestrator = TrainingOrchestrator::new(options);
//! orchestrator.add_callback(ProgressCallback::default());
//! let report = orchestrator.run().unwrap();
//! println!("run {} wrote {} stats records", report.run_id, report.updates_completed);
//! ```

pub mod callback;
mod checkpoint;
mod options;
mod orchestrator;
mod rotation;
mod run_id;
mod stats;

pub use callback::{
    CallbackAction, CallbackContext, CallbackManager, NonFiniteGuard, ProgressCallback,
    TrainerCallback,
};
pub use checkpoint::{Checkpointer, JsonCheckpointer};
pub use options::TrainOptions;
pub use orchestrator::{RunReport, TrainingOrchestrator};
pub use rotation::style_slot;
pub use run_id::{allocate_run_id, ensure_dir};
pub use stats::StatsWriter;
