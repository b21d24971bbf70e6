//! Property-based tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_config;
use crate::config::schema::*;
use proptest::prelude::*;

fn arb_valid_spec() -> impl Strategy<Value = RunSpec> {
    (
        1usize..256,     // batch_size
        1usize..64,      // max_nodes
        1e-6f32..1.0,    // lr
        1usize..100,     // epochs
        1usize..20,      // num_z_samples
        0.0f32..100.0,   // alpha
    )
        .prop_map(|(batch_size, max_nodes, lr, epochs, num_z_samples, alpha)| {
            let mut spec = RunSpec::default();
            spec.data.demo = Some(DemoSpec::default());
            spec.data.batch_size = batch_size;
            spec.data.max_nodes = max_nodes;
            spec.optimizers.generator = OptimSpec::adam(lr);
            spec.pretrain.epochs = epochs;
            spec.train.epochs = epochs;
            spec.train.num_z_samples = num_z_samples;
            spec.train.alpha = alpha;
            spec
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_spec_passes(spec in arb_valid_spec()) {
        prop_assert!(validate_config(&spec).is_ok());
    }

    #[test]
    fn prop_zero_batch_size_fails(spec in arb_valid_spec()) {
        let mut spec = spec;
        spec.data.batch_size = 0;
        prop_assert!(matches!(
            validate_config(&spec),
            Err(ValidationError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn prop_lr_above_one_fails(spec in arb_valid_spec(), lr in 1.0001f32..100.0) {
        let mut spec = spec;
        spec.optimizers.discriminator.lr = lr;
        let is_invalid_lr = matches!(
            validate_config(&spec),
            Err(ValidationError::InvalidLearningRate { .. })
        );
        prop_assert!(is_invalid_lr);
    }

    #[test]
    fn prop_zero_eval_samples_fails(spec in arb_valid_spec()) {
        let mut spec = spec;
        spec.train.eval_z_samples = 0;
        prop_assert!(validate_config(&spec).is_err());
    }
}
