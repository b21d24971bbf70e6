//! Tests for learning rate schedulers

use super::*;
use crate::optim::{Optimizer, SGD};
use approx::assert_abs_diff_eq;

#[test]
fn test_cosine_annealing_initial_lr() {
    let scheduler = CosineAnnealingLR::new(1.0, 100, 0.0);
    assert_abs_diff_eq!(scheduler.get_lr(), 1.0, epsilon = 1e-6);
}

#[test]
fn test_cosine_annealing_midpoint() {
    let mut scheduler = CosineAnnealingLR::new(1.0, 100, 0.0);
    for _ in 0..50 {
        scheduler.step();
    }
    // cos(pi/2) = 0, so lr = lr_max / 2
    assert_abs_diff_eq!(scheduler.get_lr(), 0.5, epsilon = 1e-4);
}

#[test]
fn test_cosine_annealing_clamps_at_min() {
    let mut scheduler = CosineAnnealingLR::new(1.0, 10, 0.1);
    for _ in 0..25 {
        scheduler.step();
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 0.1, epsilon = 1e-6);
}

#[test]
fn test_cosine_annealing_decreases_monotonically() {
    let mut scheduler = CosineAnnealingLR::new(1.0, 100, 0.0);
    let mut prev_lr = scheduler.get_lr();
    for _ in 0..100 {
        scheduler.step();
        let lr = scheduler.get_lr();
        assert!(lr <= prev_lr);
        prev_lr = lr;
    }
}

#[test]
fn test_step_decay_schedule() {
    let mut scheduler = StepDecayLR::new(0.1, 3, 0.5);
    let mut lrs = Vec::new();
    for _ in 0..7 {
        lrs.push(scheduler.get_lr());
        scheduler.step();
    }
    let expected = [0.1, 0.1, 0.1, 0.05, 0.05, 0.05, 0.025];
    for (lr, want) in lrs.iter().zip(expected) {
        assert_abs_diff_eq!(*lr, want, epsilon = 1e-7);
    }
}

#[test]
fn test_step_decay_zero_step_size_is_constant() {
    let mut scheduler = StepDecayLR::new(0.3, 0, 0.1);
    scheduler.step();
    scheduler.step();
    assert_abs_diff_eq!(scheduler.get_lr(), 0.3, epsilon = 1e-7);
}

#[test]
fn test_constant_lr() {
    let mut scheduler = ConstantLR::new(0.02);
    for _ in 0..5 {
        scheduler.step();
    }
    assert_eq!(scheduler.get_lr(), 0.02);
}

#[test]
fn test_scheduler_applies_to_boxed_optimizer() {
    let mut optimizer: Box<dyn Optimizer> = Box::new(SGD::new(1.0, 0.0));
    let mut scheduler = StepDecayLR::new(1.0, 1, 0.5);
    scheduler.step();
    scheduler.apply(optimizer.as_mut());
    assert_abs_diff_eq!(optimizer.lr(), 0.5, epsilon = 1e-7);
}
