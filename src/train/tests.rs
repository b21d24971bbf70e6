//! Step-level tests of the combined loop

use super::*;
use crate::autograd::scale;
use crate::data::{GraphBatch, GraphDataset, LayoutShape, COORD_DIM};
use crate::nn::{
    Classifier, Critic, Generator, MlpClassifier, MlpCritic, MlpGenerator, SplatRenderer,
};
use crate::optim::{Adam, SGD};
use crate::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::Cell;
use std::rc::Rc;
use tempfile::TempDir;

const MAX_NODES: usize = 10;

fn trainer(output_dir: &std::path::Path) -> CombinedTrainer {
    let mut rng = StdRng::seed_from_u64(42);
    let generator = MlpGenerator::new(MAX_NODES, COORD_DIM, 8, 12, &mut rng);
    let generator: Box<dyn Generator> = Box::new(generator);
    let critic: Box<dyn Critic> = Box::new(MlpCritic::new(MAX_NODES, COORD_DIM, 12, &mut rng));
    let classifier: Box<dyn Classifier> = Box::new(MlpClassifier::new(8, 16, &mut rng));
    CombinedTrainer::new(
        Player::with_constant_lr(generator, Box::new(Adam::default_params(1e-3))),
        Player::with_constant_lr(critic, Box::new(Adam::default_params(1e-3))),
        Player::with_constant_lr(classifier, Box::new(SGD::new(1e-2, 0.9))),
        Box::new(SplatRenderer::new(8, 0.25, 1.5)),
        CombinedConfig {
            num_z_samples: 3,
            eval_z_samples: 2,
            snapshot_every: 0,
            output_dir: output_dir.to_path_buf(),
            ..CombinedConfig::default()
        },
        7,
    )
}

/// Node counts {0, 3, 5, 8} padded to 10 with path adjacency
fn mixed_batch() -> GraphBatch {
    let counts = [0usize, 3, 5, 8];
    let shape = LayoutShape::new(counts.len(), MAX_NODES);
    let mut layouts = vec![0.0; shape.layout_len()];
    let mut adjacency = vec![0.0; shape.adjacency_len()];
    for (b, &count) in counts.iter().enumerate() {
        for n in 0..count {
            let at = b * shape.layout_stride() + n * COORD_DIM;
            let angle = n as f32;
            layouts[at] = 0.6 * angle.cos() + 0.05;
            layouts[at + 1] = 0.6 * angle.sin() + 0.05;
            if n + 1 < count {
                let base = b * shape.adjacency_stride();
                adjacency[base + n * MAX_NODES + n + 1] = 1.0;
                adjacency[base + (n + 1) * MAX_NODES + n] = 1.0;
            }
        }
    }
    GraphBatch::new(layouts, adjacency, vec![0, 1, 0, 1], shape).unwrap()
}

#[test]
fn test_one_step_is_finite_and_advances_each_optimizer_once() {
    let dir = TempDir::new().unwrap();
    let mut trainer = trainer(dir.path());
    let batch = mixed_batch();
    assert_eq!(batch.num_nodes(), vec![0, 3, 5, 8]);

    let outcome = trainer.train_step(&batch).unwrap();
    assert!(outcome.critic_loss.is_finite());
    assert!(outcome.generator_loss.is_finite());
    assert!(outcome.classifier_loss.is_finite());
    assert_eq!(outcome.predictions.len(), 4);
    assert_eq!(outcome.layout.len(), batch.layouts.len());

    assert_eq!(trainer.generator.optimizer.step_count(), 1);
    assert_eq!(trainer.critic.optimizer.step_count(), 1);
    assert_eq!(trainer.classifier.optimizer.step_count(), 1);
}

fn flat(params: Vec<&Tensor>) -> Vec<f32> {
    params.iter().flat_map(|p| p.to_vec()).collect()
}

#[test]
fn test_step_updates_all_three_networks() {
    let dir = TempDir::new().unwrap();
    let mut trainer = trainer(dir.path());
    let snapshot = |t: &CombinedTrainer| -> Vec<Vec<f32>> {
        vec![
            flat(t.generator.net.parameters()),
            flat(t.critic.net.parameters()),
            flat(t.classifier.net.parameters()),
        ]
    };
    let before = snapshot(&trainer);
    trainer.train_step(&mixed_batch()).unwrap();
    let after = snapshot(&trainer);
    for (b, a) in before.iter().zip(&after) {
        assert_ne!(b, a);
    }
}

#[test]
fn test_generated_padding_stays_zero_after_step() {
    let dir = TempDir::new().unwrap();
    let mut trainer = trainer(dir.path());
    let batch = mixed_batch();
    let outcome = trainer.train_step(&batch).unwrap();
    // graph 0 has no nodes
    let values = outcome.layout.to_vec();
    assert!(values[..MAX_NODES * COORD_DIM].iter().all(|&x| x == 0.0));
}

#[test]
fn test_checkpoint_restore_roundtrip() {
    let dir = TempDir::new().unwrap();
    let mut trained = trainer(dir.path());
    trained.train_step(&mixed_batch()).unwrap();
    let checkpoint = trained.checkpoint(3, 75.0, 50.0);
    let path = dir.path().join(BEST_MODEL_FILE);
    crate::io::save_checkpoint(&checkpoint, &path).unwrap();

    let mut fresh = trainer(dir.path());
    let loaded = crate::io::load_checkpoint(&path).unwrap();
    assert_eq!(loaded.epoch, 3);
    fresh.restore(&loaded, &path).unwrap();

    assert_eq!(fresh.generator.optimizer.step_count(), 1);
    assert_eq!(fresh.critic.optimizer.step_count(), 1);
    assert_eq!(fresh.classifier.optimizer.step_count(), 1);
    assert_eq!(
        flat(trained.critic.net.parameters()),
        flat(fresh.critic.net.parameters())
    );
}

#[test]
fn test_evaluate_split() {
    let dir = TempDir::new().unwrap();
    let mut trainer = trainer(dir.path());
    let dataset = GraphDataset::synthetic(6, MAX_NODES, 1);
    let mut loader = crate::data::BatchLoader::new(dataset, 4, false, 0);
    let result = trainer.evaluate(&mut loader).unwrap();
    assert!((0.0..=100.0).contains(&result.accuracy));
    assert!((0.0..=1.0).contains(&result.f1));
}

/// Counts calls and scales the mean-gap objective to zero
struct SilencedLoss {
    calls: Rc<Cell<usize>>,
}

impl WassersteinLoss for SilencedLoss {
    fn critic_loss(&self, real_scores: &Tensor, fake_scores: &Tensor) -> Tensor {
        self.calls.set(self.calls.get() + 1);
        let gap = MeanGapWasserstein.critic_loss(real_scores, fake_scores);
        scale(&gap, 0.0)
    }

    fn generator_loss(&self, fake_scores: &Tensor) -> Tensor {
        self.calls.set(self.calls.get() + 1);
        scale(&MeanGapWasserstein.generator_loss(fake_scores), 0.0)
    }
}

#[test]
fn test_custom_wasserstein_loss_drives_the_step() {
    let dir = TempDir::new().unwrap();
    let calls = Rc::new(Cell::new(0));
    let loss = Box::new(SilencedLoss {
        calls: Rc::clone(&calls),
    });
    let mut trainer = trainer(dir.path()).with_loss(loss);

    let outcome = trainer.train_step(&mixed_batch()).unwrap();
    // one critic call plus one generator call per noise draw
    assert_eq!(calls.get(), 1 + 3);
    // only the weighted classification term is left in the generator objective
    let alpha = trainer.config().alpha;
    assert!((outcome.generator_loss - alpha * outcome.classifier_loss).abs() < 1e-5);
    // the gradient penalty is all the critic sees
    assert!(outcome.critic_loss >= 0.0);
}
