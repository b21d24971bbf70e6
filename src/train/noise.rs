use crate::Tensor;
use rand::Rng;
use rand_distr::StandardNormal;

/// Standard normal latent batch `[batch_size, dim]`
pub fn sample_noise(batch_size: usize, dim: usize, rng: &mut impl Rng) -> Tensor {
    let data = (0..batch_size * dim)
        .map(|_| rng.sample::<f32, _>(StandardNormal))
        .collect();
    Tensor::from_vec(data, false)
}
