//! Two-layer image classifier

use super::linear::Linear;
use super::{Classifier, Module};
use crate::autograd::relu;
use crate::data::NUM_CLASSES;
use crate::Tensor;
use rand::Rng;

/// `logits = W_2 relu(W_1 image + b_1) + b_2`
pub struct MlpClassifier {
    hidden: Linear,
    out: Linear,
}

impl MlpClassifier {
    pub fn new(image_size: usize, hidden_dim: usize, rng: &mut impl Rng) -> Self {
        Self {
            hidden: Linear::new(image_size * image_size, hidden_dim, rng),
            out: Linear::new(hidden_dim, NUM_CLASSES, rng),
        }
    }
}

impl Module for MlpClassifier {
    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        let mut params = self.hidden.named_parameters("hidden");
        params.extend(self.out.named_parameters("out"));
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.hidden.parameters_mut();
        params.extend(self.out.parameters_mut());
        params
    }
}

impl Classifier for MlpClassifier {
    fn classify(&self, images: &Tensor, batch_size: usize) -> Tensor {
        let hidden = relu(&self.hidden.forward(images, batch_size));
        self.out.forward(&hidden, batch_size)
    }
}
