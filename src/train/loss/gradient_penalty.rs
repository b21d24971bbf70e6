//! Gradient penalty for Wasserstein critics

use crate::autograd::{add_scalar, concat_cols, mean, mul, row_norms, scale};
use crate::data::LayoutShape;
use crate::nn::Critic;
use crate::Tensor;
use rand::Rng;

/// Penalty weight when a call site does not configure one
pub const DEFAULT_PENALTY_WEIGHT: f32 = 3.0;

/// `weight · mean_b((‖∇_{x̂,â} Σ critic(x̂, â)‖_b − 1)²)`
///
/// `x̂` interpolates real and fake layouts with one uniform coefficient per
/// graph; `â` interpolates the adjacency matrices with one coefficient per
/// entry. Per graph, the layout gradient and the adjacency gradient are
/// concatenated before taking the norm. Fakes are read by value, so the
/// result only depends on the critic parameters.
#[allow(clippy::too_many_arguments)]
pub fn gradient_penalty<C: Critic + ?Sized>(
    critic: &C,
    real: &Tensor,
    fake: &Tensor,
    real_adjacency: &Tensor,
    fake_adjacency: &Tensor,
    shape: LayoutShape,
    weight: f32,
    rng: &mut impl Rng,
) -> Tensor {
    let b = shape.batch_size;
    let layout_cols = shape.layout_stride();
    let adjacency_cols = shape.adjacency_stride();
    assert_eq!(
        real.len(),
        b * layout_cols,
        "gradient_penalty: real layout shape"
    );
    assert_eq!(
        fake.len(),
        b * layout_cols,
        "gradient_penalty: fake layout shape"
    );

    let mut layout = Vec::with_capacity(b * layout_cols);
    for g in 0..b {
        let alpha: f32 = rng.gen();
        for i in g * layout_cols..(g + 1) * layout_cols {
            layout.push(alpha * real.data()[i] + (1.0 - alpha) * fake.data()[i]);
        }
    }
    let adjacency: Vec<f32> = real_adjacency
        .data()
        .iter()
        .zip(fake_adjacency.data().iter())
        .map(|(&r, &f)| {
            let beta: f32 = rng.gen();
            beta * r + (1.0 - beta) * f
        })
        .collect();

    let grads = critic.input_gradients(
        &Tensor::from_vec(layout, false),
        &Tensor::from_vec(adjacency, false),
        shape,
    );
    let blocks = [
        (&grads.layout, layout_cols),
        (&grads.adjacency, adjacency_cols),
    ];
    let joint = concat_cols(&blocks, b);
    let deviation = add_scalar(&row_norms(&joint, b, layout_cols + adjacency_cols), -1.0);
    scale(&mean(&mul(&deviation, &deviation)), weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{backward, broadcast_rows, matmul};
    use crate::nn::{InputGradients, MlpCritic, Module};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// score_b = w_x · x_b + w_a · a_b, so ∇ is (w_x, w_a) for every graph
    struct LinearCritic {
        w_layout: Tensor,
        w_adjacency: Tensor,
    }

    impl LinearCritic {
        fn with_norm(shape: LayoutShape, norm: f32) -> Self {
            let lc = shape.layout_stride();
            let ac = shape.adjacency_stride();
            let per = norm / ((lc + ac) as f32).sqrt();
            Self {
                w_layout: Tensor::from_vec(vec![per; lc], true),
                w_adjacency: Tensor::from_vec(vec![per; ac], true),
            }
        }
    }

    impl Module for LinearCritic {
        fn named_parameters(&self) -> Vec<(String, &Tensor)> {
            vec![
                ("w_layout".to_string(), &self.w_layout),
                ("w_adjacency".to_string(), &self.w_adjacency),
            ]
        }

        fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
            vec![&mut self.w_layout, &mut self.w_adjacency]
        }
    }

    impl Critic for LinearCritic {
        fn score(&self, layout: &Tensor, adjacency: &Tensor, shape: LayoutShape) -> Tensor {
            let b = shape.batch_size;
            let x = matmul(layout, &self.w_layout, b, shape.layout_stride(), 1);
            let a = matmul(adjacency, &self.w_adjacency, b, shape.adjacency_stride(), 1);
            crate::autograd::add(&x, &a)
        }

        fn input_gradients(&self, _: &Tensor, _: &Tensor, shape: LayoutShape) -> InputGradients {
            InputGradients {
                layout: broadcast_rows(&self.w_layout, shape.batch_size),
                adjacency: broadcast_rows(&self.w_adjacency, shape.batch_size),
            }
        }
    }

    fn batch(shape: LayoutShape, offset: f32) -> (Tensor, Tensor) {
        let layout = (0..shape.layout_len())
            .map(|i| (i as f32 * 0.3 + offset).sin())
            .collect();
        let adjacency = (0..shape.adjacency_len())
            .map(|i| ((i + offset as usize) % 2) as f32)
            .collect();
        (Tensor::from_vec(layout, false), Tensor::from_vec(adjacency, false))
    }

    /// Penalty between the batches built with offsets 0 and `fake_offset`
    fn penalty(
        critic: &dyn Critic,
        shape: LayoutShape,
        fake_offset: f32,
        weight: f32,
        seed: u64,
    ) -> Tensor {
        let (real, ra) = batch(shape, 0.0);
        let (fake, fa) = batch(shape, fake_offset);
        let mut rng = StdRng::seed_from_u64(seed);
        gradient_penalty(critic, &real, &fake, &ra, &fa, shape, weight, &mut rng)
    }

    #[test]
    fn test_unit_gradient_norm_gives_zero_penalty() {
        let shape = LayoutShape::new(3, 4);
        let critic = LinearCritic::with_norm(shape, 1.0);
        let gp = penalty(&critic, shape, 1.0, 5.0, 0);
        assert_abs_diff_eq!(gp.item(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_penalty_value_and_weight() {
        let shape = LayoutShape::new(2, 3);
        let critic = LinearCritic::with_norm(shape, 3.0);
        // (3 - 1)² = 4 per graph
        let gp = penalty(&critic, shape, 2.0, 1.0, 1);
        assert_abs_diff_eq!(gp.item(), 4.0, epsilon = 1e-4);
        let gp = penalty(&critic, shape, 2.0, DEFAULT_PENALTY_WEIGHT, 1);
        assert_abs_diff_eq!(gp.item(), 12.0, epsilon = 1e-3);
    }

    #[test]
    fn test_penalty_backpropagates_to_critic() {
        let shape = LayoutShape::new(2, 4);
        let mut rng = StdRng::seed_from_u64(2);
        let critic = MlpCritic::new(4, 2, 8, &mut rng);
        let gp = penalty(&critic, shape, 1.5, 5.0, 2);
        assert!(gp.item().is_finite());
        backward(&gp, None);
        let params = critic.parameters();
        let touched = params.iter().filter(|p| p.grad().is_some()).count();
        assert!(touched >= 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_penalty_is_non_negative(
            norm in 0.0f32..4.0,
            weight in 0.0f32..10.0,
            seed in any::<u64>()
        ) {
            let shape = LayoutShape::new(2, 3);
            let critic = LinearCritic::with_norm(shape, norm);
            let gp = penalty(&critic, shape, 1.0, weight, seed);
            prop_assert!(gp.item() >= 0.0);
            let expected = weight * (norm - 1.0).powi(2);
            prop_assert!((gp.item() - expected).abs() <= 1e-3 * (1.0 + expected));
        }
    }
}
