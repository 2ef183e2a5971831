//! Step-level callbacks for training events
//!
//! Hooks fire at run start, after every optimizer step, and at run end.
//! Callbacks observe state; the only control they exert is requesting a
//! stop, which the orchestrator reports as an early exit.

/// Snapshot of training state passed to callbacks.
#[derive(Clone, Debug, Default)]
pub struct CallbackContext {
    /// Current update count (0-indexed)
    pub update: usize,
    /// Configured update budget
    pub total_updates: usize,
    /// Rotation slot used this step
    pub slot: usize,
    /// Catalog style index behind the slot
    pub style_index: usize,
    /// Scaled style loss for this step
    pub style_loss: f32,
    /// Scaled content loss for this step
    pub content_loss: f32,
    /// Combined loss for this step
    pub total_loss: f32,
    /// Current learning rate
    pub lr: f32,
    /// Run duration in seconds
    pub elapsed_secs: f64,
}

/// Action to take after a callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Continue training normally
    Continue,
    /// Stop the run before the budget is reached
    Stop,
}

/// Trait for training callbacks
///
/// All methods have default no-op implementations, so implementors only
/// override the events they care about.
pub trait TrainerCallback: Send {
    /// Called before the loop starts
    fn on_train_begin(&mut self, _ctx: &CallbackContext) {}

    /// Called after each optimizer step
    fn on_step_end(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called after the loop ends
    fn on_train_end(&mut self, _ctx: &CallbackContext) {}

    /// Get callback name for diagnostics
    fn name(&self) -> &str {
        "TrainerCallback"
    }
}

/// Ordered collection of callbacks fired by the orchestrator.
#[derive(Default)]
pub struct CallbackManager {
    callbacks: Vec<Box<dyn TrainerCallback>>,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn on_train_begin(&mut self, ctx: &CallbackContext) {
        for callback in &mut self.callbacks {
            callback.on_train_begin(ctx);
        }
    }

    /// Fires every callback; a single `Stop` wins.
    pub fn on_step_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        let mut action = CallbackAction::Continue;
        for callback in &mut self.callbacks {
            if callback.on_step_end(ctx) == CallbackAction::Stop {
                action = CallbackAction::Stop;
            }
        }
        action
    }

    pub fn on_train_end(&mut self, ctx: &CallbackContext) {
        for callback in &mut self.callbacks {
            callback.on_train_end(ctx);
        }
    }
}

// =============================================================================
// Progress Callback
// =============================================================================

/// Prints per-step progress with whole-number loss values.
///
/// The rounding is display-only; the stats file always receives the raw
/// magnitudes.
#[derive(Clone, Debug)]
pub struct ProgressCallback {
    /// Print every N steps
    log_interval: usize,
}

impl ProgressCallback {
    pub fn new(log_interval: usize) -> Self {
        Self {
            log_interval: log_interval.max(1),
        }
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self { log_interval: 1 }
    }
}

impl TrainerCallback for ProgressCallback {
    fn on_train_begin(&mut self, ctx: &CallbackContext) {
        println!("Training for {} parameter updates", ctx.total_updates);
    }

    fn on_step_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        if (ctx.update + 1) % self.log_interval == 0 {
            println!(
                "update {}/{} (style {}): style_loss={:.0} content_loss={:.0}",
                ctx.update + 1,
                ctx.total_updates,
                ctx.style_index,
                ctx.style_loss,
                ctx.content_loss
            );
        }
        CallbackAction::Continue
    }

    fn on_train_end(&mut self, ctx: &CallbackContext) {
        println!(
            "Finished {} updates in {:.1}s",
            ctx.update, ctx.elapsed_secs
        );
    }

    fn name(&self) -> &str {
        "ProgressCallback"
    }
}

// =============================================================================
// Non-Finite Guard
// =============================================================================

/// Stops the run when the combined loss goes non-finite.
///
/// Divergence is otherwise silent: without this guard a NaN loss keeps
/// feeding the optimizer. Wired by the CLI when `halt_on_non_finite` is set.
#[derive(Clone, Copy, Debug, Default)]
pub struct NonFiniteGuard;

impl TrainerCallback for NonFiniteGuard {
    fn on_step_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        if ctx.total_loss.is_finite() {
            CallbackAction::Continue
        } else {
            eprintln!("Non-finite loss at update {}, stopping run", ctx.update);
            CallbackAction::Stop
        }
    }

    fn name(&self) -> &str {
        "NonFiniteGuard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StopAfter {
        remaining: usize,
    }

    impl TrainerCallback for StopAfter {
        fn on_step_end(&mut self, _ctx: &CallbackContext) -> CallbackAction {
            if self.remaining == 0 {
                return CallbackAction::Stop;
            }
            self.remaining -= 1;
            CallbackAction::Continue
        }
    }

    #[test]
    fn manager_reports_stop_from_any_callback() {
        let mut manager = CallbackManager::new();
        manager.add(ProgressCallback::new(1000));
        manager.add(StopAfter { remaining: 1 });
        assert_eq!(manager.len(), 2);

        let ctx = CallbackContext::default();
        assert_eq!(manager.on_step_end(&ctx), CallbackAction::Continue);
        assert_eq!(manager.on_step_end(&ctx), CallbackAction::Stop);
    }

    #[test]
    fn guard_passes_finite_losses() {
        let mut guard = NonFiniteGuard;
        let ctx = CallbackContext {
            total_loss: 123.0,
            ..Default::default()
        };
        assert_eq!(guard.on_step_end(&ctx), CallbackAction::Continue);
    }

    #[test]
    fn guard_stops_on_nan_and_infinity() {
        let mut guard = NonFiniteGuard;
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let ctx = CallbackContext {
                total_loss: bad,
                ..Default::default()
            };
            assert_eq!(guard.on_step_end(&ctx), CallbackAction::Stop);
        }
    }
}
