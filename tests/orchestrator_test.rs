//! Integration tests for the training orchestrator
//!
//! The mock collaborators isolate loop semantics (rotation, termination,
//! stats persistence, weighting, early stop) from the reference model and
//! scorer, which get their own end-to-end run at the bottom.

use estilizar::codec::{save_tensor_as_image, ImageTensor};
use estilizar::data::BatchSource;
use estilizar::io::load_params;
use estilizar::model::{Param, PerceptualScore, PerceptualScorer, TransferModel};
use estilizar::optim::Optimizer;
use estilizar::train::{allocate_run_id, NonFiniteGuard, TrainOptions, TrainingOrchestrator};
use estilizar::Result;
use ndarray::Array4;
use std::cell::RefCell;
use std::rc::Rc;

const DIM: (usize, usize, usize, usize) = (2, 3, 4, 4);

struct FixedSource;

impl BatchSource for FixedSource {
    fn next_batch(&mut self) -> Result<ImageTensor> {
        Ok(Array4::from_elem(DIM, 0.5))
    }
}

/// Identity model that records the slot of every forward call.
struct RecordingModel {
    params: Vec<Param>,
    style_count: usize,
    slots: Rc<RefCell<Vec<usize>>>,
}

impl RecordingModel {
    fn new(style_count: usize) -> (Self, Rc<RefCell<Vec<usize>>>) {
        let slots = Rc::new(RefCell::new(Vec::new()));
        let model = Self {
            params: vec![Param::ones(3)],
            style_count,
            slots: Rc::clone(&slots),
        };
        (model, slots)
    }
}

impl TransferModel for RecordingModel {
    fn forward(&mut self, content: &ImageTensor, slot: usize) -> Result<ImageTensor> {
        self.slots.borrow_mut().push(slot);
        Ok(content.clone())
    }

    fn backward(&mut self, _grad_output: &ImageTensor) -> Result<()> {
        self.params[0].accumulate_grad(ndarray::Array1::ones(3));
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

    fn set_train(&mut self, _train: bool) {}
}

/// Scorer returning fixed raw losses with zero gradients.
struct ConstScorer {
    content_loss: f32,
    style_loss: f32,
}

impl PerceptualScorer for ConstScorer {
    fn score(
        &self,
        _content: &ImageTensor,
        _generated: &ImageTensor,
        _slot: usize,
    ) -> Result<PerceptualScore> {
        Ok(PerceptualScore {
            content_loss: self.content_loss,
            style_loss: self.style_loss,
            content_grad: Array4::zeros(DIM),
            style_grad: Array4::zeros(DIM),
        })
    }

    fn style_count(&self) -> usize {
        8
    }
}

struct NullOptimizer;

impl Optimizer for NullOptimizer {
    fn step(&mut self, _params: &mut [Param]) {}

    fn lr(&self) -> f32 {
        1e-3
    }

    fn set_lr(&mut self, _lr: f32) {}
}

fn mock_options(dir: &std::path::Path, updates: usize) -> TrainOptions {
    TrainOptions::new(
        dir.join("images"),
        dir.join("styles"),
        dir.join("checkpoints"),
        dir.join("stats"),
    )
    .with_num_parameter_updates(updates)
    .with_style_idxs(vec![0, 3])
}

fn run_mocked(
    options: TrainOptions,
    style_count: usize,
    scorer: ConstScorer,
    guard: bool,
) -> (estilizar::RunReport, Rc<RefCell<Vec<usize>>>) {
    std::fs::create_dir_all(&options.stats_dir).unwrap();
    let mut orchestrator = TrainingOrchestrator::new(options);
    if guard {
        orchestrator.add_callback(NonFiniteGuard);
    }
    let (mut model, slots) = RecordingModel::new(style_count);
    let report = orchestrator
        .run_with(
            "0001",
            &mut FixedSource,
            &mut model,
            &scorer,
            &mut NullOptimizer,
        )
        .unwrap();
    (report, slots)
}

#[test]
fn loop_terminates_at_the_budget_and_rotates_styles() {
    let dir = tempfile::tempdir().unwrap();
    let options = mock_options(dir.path(), 5);
    let scorer = ConstScorer {
        content_loss: 1.0,
        style_loss: 1.0,
    };

    let (report, slots) = run_mocked(options, 2, scorer, false);

    assert_eq!(report.updates_completed, 5);
    assert!(!report.stopped_early);
    assert_eq!(*slots.borrow(), vec![0, 1, 0, 1, 0]);
}

#[test]
fn stats_file_has_one_line_per_update_with_weighted_losses() {
    let dir = tempfile::tempdir().unwrap();
    let options = mock_options(dir.path(), 3).with_weights(100.0, 1000.0);
    // Powers of two keep the weighted values exact in f32.
    let scorer = ConstScorer {
        content_loss: 0.5,
        style_loss: 0.25,
    };

    let (report, _) = run_mocked(options, 2, scorer, false);

    let contents = std::fs::read_to_string(&report.stats_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "0, 250, 50");
    assert_eq!(lines[1], "1, 250, 50");
    assert_eq!(lines[2], "2, 250, 50");
    assert_eq!(
        report.stats_path.file_name().unwrap().to_str().unwrap(),
        "stats0001.csv"
    );
}

#[test]
fn default_weights_scale_raw_losses_before_persisting() {
    let dir = tempfile::tempdir().unwrap();
    // Default weights: content 1e5, style 1e10.
    let options = mock_options(dir.path(), 1);
    let scorer = ConstScorer {
        content_loss: 0.001,
        style_loss: 0.000_000_2,
    };

    let (report, _) = run_mocked(options, 2, scorer, false);

    let contents = std::fs::read_to_string(&report.stats_path).unwrap();
    let fields: Vec<f32> = contents
        .lines()
        .next()
        .unwrap()
        .split(", ")
        .map(|f| f.parse().unwrap())
        .collect();
    assert_eq!(fields[0], 0.0);
    approx::assert_relative_eq!(fields[1], 2000.0, max_relative = 1e-4);
    approx::assert_relative_eq!(fields[2], 100.0, max_relative = 1e-4);
}

#[test]
fn non_finite_guard_stops_after_the_offending_step() {
    let dir = tempfile::tempdir().unwrap();
    let options = mock_options(dir.path(), 10);
    let scorer = ConstScorer {
        content_loss: f32::NAN,
        style_loss: 1.0,
    };

    let (report, slots) = run_mocked(options, 2, scorer, true);

    assert!(report.stopped_early);
    assert_eq!(report.updates_completed, 1);
    assert_eq!(slots.borrow().len(), 1);

    // The offending step is still recorded before the stop.
    let contents = std::fs::read_to_string(&report.stats_path).unwrap();
    assert_eq!(contents.lines().count(), 1);
}

#[test]
fn single_style_always_uses_slot_zero() {
    let dir = tempfile::tempdir().unwrap();
    let options = mock_options(dir.path(), 4).with_style_idxs(vec![3]);
    let scorer = ConstScorer {
        content_loss: 1.0,
        style_loss: 1.0,
    };

    let (_, slots) = run_mocked(options, 1, scorer, false);
    assert_eq!(*slots.borrow(), vec![0, 0, 0, 0]);
}

#[test]
fn run_ids_count_existing_checkpoint_directories() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("checkpoints");
    std::fs::create_dir_all(&root).unwrap();
    assert_eq!(allocate_run_id(&root).unwrap(), "0001");

    std::fs::create_dir(root.join("0001")).unwrap();
    std::fs::create_dir(root.join("0002")).unwrap();
    assert_eq!(allocate_run_id(&root).unwrap(), "0003");
}

fn write_gradient_image(path: &std::path::Path, offset: f32) {
    let mut tensor = Array4::zeros((1, 3, 16, 16));
    for (i, v) in tensor.iter_mut().enumerate() {
        *v = (offset + 0.002 * i as f32).clamp(0.0, 1.0);
    }
    save_tensor_as_image(&tensor, path).unwrap();
}

#[test]
fn end_to_end_run_with_reference_collaborators() {
    let dir = tempfile::tempdir().unwrap();
    let image_dir = dir.path().join("images");
    let style_dir = dir.path().join("styles");
    std::fs::create_dir_all(&image_dir).unwrap();
    std::fs::create_dir_all(&style_dir).unwrap();

    write_gradient_image(&image_dir.join("a.png"), 0.1);
    write_gradient_image(&image_dir.join("b.png"), 0.3);
    write_gradient_image(&image_dir.join("c.png"), 0.5);
    write_gradient_image(&style_dir.join("style0.png"), 0.2);
    write_gradient_image(&style_dir.join("style1.png"), 0.7);

    let options = TrainOptions::new(
        &image_dir,
        &style_dir,
        dir.path().join("checkpoints"),
        dir.path().join("stats"),
    )
    .with_batch_size(2)
    .with_num_parameter_updates(5)
    .with_style_idxs(vec![0, 1])
    .with_seed(7)
    .with_snapshots(5);

    let mut orchestrator = TrainingOrchestrator::new(options);
    let report = orchestrator.run().unwrap();

    assert_eq!(report.run_id, "0001");
    assert_eq!(report.updates_completed, 5);
    assert!(report.final_style_loss.is_finite());
    assert!(report.final_content_loss.is_finite());

    let stats = std::fs::read_to_string(&report.stats_path).unwrap();
    assert_eq!(stats.lines().count(), 5);
    for (i, line) in stats.lines().enumerate() {
        assert!(line.starts_with(&format!("{i}, ")));
    }

    let snapshot = dir
        .path()
        .join("checkpoints")
        .join("0001")
        .join("update_000005.json");
    assert!(snapshot.is_file());
    let params = load_params(&snapshot).unwrap();
    // Shared gain plus scale and bias for each of the two styles.
    assert_eq!(params.len(), 5);

    // A second run allocates the next id.
    let report2 = TrainingOrchestrator::new(
        TrainOptions::new(
            &image_dir,
            &style_dir,
            dir.path().join("checkpoints"),
            dir.path().join("stats"),
        )
        .with_batch_size(2)
        .with_num_parameter_updates(1)
        .with_style_idxs(vec![0]),
    )
    .run()
    .unwrap();
    assert_eq!(report2.run_id, "0002");
}
