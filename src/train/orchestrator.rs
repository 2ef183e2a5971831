//! Training orchestration loop
//!
//! Owns the run lifecycle: directory and run-id allocation, collaborator
//! construction, the optimization loop with deterministic style rotation
//! and weighted content/style losses, progress callbacks, and per-step
//! stats persistence.

use super::callback::{CallbackAction, CallbackContext, CallbackManager, TrainerCallback};
use super::checkpoint::{Checkpointer, JsonCheckpointer};
use super::{allocate_run_id, ensure_dir, style_slot, StatsWriter, TrainOptions};
use crate::codec::{normalise_batch, normalise_batch_grad};
use crate::data::{BatchSource, ContentStream, StyleCatalog};
use crate::device::Device;
use crate::model::{ChannelAffineTransfer, MomentMatchingScorer, PerceptualScorer, TransferModel};
use crate::optim::{Adam, Optimizer};
use crate::Result;
use std::path::PathBuf;
use std::time::Instant;

/// Summary of a completed training run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Zero-padded sequential run id
    pub run_id: String,
    /// Optimizer steps performed
    pub updates_completed: usize,
    /// Scaled style loss of the last step
    pub final_style_loss: f32,
    /// Scaled content loss of the last step
    pub final_content_loss: f32,
    /// Stats file written by this run
    pub stats_path: PathBuf,
    /// Wall-clock duration in seconds
    pub elapsed_secs: f64,
    /// Whether a callback stopped the run before the budget
    pub stopped_early: bool,
}

/// Drives a full training run.
///
/// Collaborators are black boxes behind the `BatchSource`, `TransferModel`,
/// `PerceptualScorer` and `Optimizer` seams; `run` wires the crate's
/// reference implementations while `run_with` accepts substitutes.
pub struct TrainingOrchestrator {
    options: TrainOptions,
    callbacks: CallbackManager,
    checkpointer: Option<Box<dyn Checkpointer>>,
}

impl TrainingOrchestrator {
    pub fn new(options: TrainOptions) -> Self {
        Self {
            options,
            callbacks: CallbackManager::new(),
            checkpointer: None,
        }
    }

    pub fn options(&self) -> &TrainOptions {
        &self.options
    }

    pub fn add_callback<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.add(callback);
    }

    /// Replace the default JSON checkpointer.
    pub fn set_checkpointer(&mut self, checkpointer: Box<dyn Checkpointer>) {
        self.checkpointer = Some(checkpointer);
    }

    /// Run a full training run with the crate's reference collaborators.
    pub fn run(&mut self) -> Result<RunReport> {
        ensure_dir(&self.options.checkpoint_dir)?;
        ensure_dir(&self.options.stats_dir)?;
        let run_id = allocate_run_id(&self.options.checkpoint_dir)?;

        let mut source = ContentStream::open(
            &self.options.image_dir,
            self.options.batch_size,
            self.options.seed,
        )?;

        let catalog = StyleCatalog::open(&self.options.style_dir)?;
        let styles = catalog.get_style_tensor_subset(&self.options.style_idxs)?;

        let device = Device::preferred();
        let mut model = ChannelAffineTransfer::new(styles.len());
        model.set_train(true);
        let mut optimizer = Adam::default_params(self.options.lr).with_device(device);

        let normalised: Vec<_> = styles.iter().map(normalise_batch).collect();
        let scorer = MomentMatchingScorer::from_styles(&normalised)?;

        if self.checkpointer.is_none()
            && (self.options.snapshot_interval.is_some() || self.options.snapshot_final)
        {
            self.checkpointer = Some(Box::new(JsonCheckpointer::new(
                self.options.checkpoint_dir.clone(),
            )));
        }

        self.run_with(&run_id, &mut source, &mut model, &scorer, &mut optimizer)
    }

    /// Drive the optimization loop with caller-supplied collaborators.
    ///
    /// `run_id` names the stats file; the caller is responsible for the
    /// directory setup that `run` performs. The rotation modulus is the
    /// model's `style_count`, which must match the scorer's target count.
    pub fn run_with(
        &mut self,
        run_id: &str,
        source: &mut dyn BatchSource,
        model: &mut dyn TransferModel,
        scorer: &dyn PerceptualScorer,
        optimizer: &mut dyn Optimizer,
    ) -> Result<RunReport> {
        let style_count = model.style_count();
        let total_updates = self.options.num_parameter_updates;
        let mut stats = StatsWriter::create(&self.options.stats_dir, run_id)?;

        let start = Instant::now();
        let mut update_count = 0usize;
        let mut stopped_early = false;
        let mut last_style_loss = 0.0f32;
        let mut last_content_loss = 0.0f32;

        self.callbacks.on_train_begin(&CallbackContext {
            total_updates,
            lr: optimizer.lr(),
            ..Default::default()
        });

        while update_count < total_updates {
            let x = source.next_batch()?;
            let slot = style_slot(update_count, style_count);

            optimizer.zero_grad(model.params_mut());
            let y = model.forward(&x, slot)?;
            let x_norm = normalise_batch(&x);
            let y_norm = normalise_batch(&y);
            let score = scorer.score(&x_norm, &y_norm, slot)?;

            let content_loss = score.content_loss * self.options.content_weight;
            let style_loss = score.style_loss * self.options.style_weight;
            let total_loss = content_loss + style_loss;

            // The scorer differentiates against the normalised batch; fold
            // the normalisation back in before reaching the model.
            let grad = normalise_batch_grad(
                &(&score.content_grad * self.options.content_weight
                    + &score.style_grad * self.options.style_weight),
            );
            model.backward(&grad)?;
            optimizer.step(model.params_mut());

            let ctx = CallbackContext {
                update: update_count,
                total_updates,
                slot,
                style_index: self
                    .options
                    .style_idxs
                    .get(slot)
                    .copied()
                    .unwrap_or(slot),
                style_loss,
                content_loss,
                total_loss,
                lr: optimizer.lr(),
                elapsed_secs: start.elapsed().as_secs_f64(),
            };
            let action = self.callbacks.on_step_end(&ctx);

            stats.append(update_count, style_loss, content_loss)?;
            update_count += 1;
            last_style_loss = style_loss;
            last_content_loss = content_loss;

            if let (Some(checkpointer), Some(interval)) =
                (self.checkpointer.as_mut(), self.options.snapshot_interval)
            {
                if update_count % interval == 0 {
                    checkpointer.save(model.params(), run_id, update_count)?;
                }
            }

            if action == CallbackAction::Stop {
                stopped_early = true;
                break;
            }
        }

        if self.options.snapshot_final {
            if let Some(checkpointer) = self.checkpointer.as_mut() {
                checkpointer.save(model.params(), run_id, update_count)?;
            }
        }

        let stats_path = stats.path().to_path_buf();
        stats.finish()?;

        let elapsed_secs = start.elapsed().as_secs_f64();
        self.callbacks.on_train_end(&CallbackContext {
            update: update_count,
            total_updates,
            style_loss: last_style_loss,
            content_loss: last_content_loss,
            total_loss: last_style_loss + last_content_loss,
            lr: optimizer.lr(),
            elapsed_secs,
            ..Default::default()
        });

        Ok(RunReport {
            run_id: run_id.to_string(),
            updates_completed: update_count,
            final_style_loss: last_style_loss,
            final_content_loss: last_content_loss,
            stats_path,
            elapsed_secs,
            stopped_early,
        })
    }
}
