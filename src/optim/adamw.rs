//! AdamW optimizer (Adam with decoupled Weight decay)

use super::optimizer::{from_buffers, to_buffers};
use super::{Optimizer, OptimizerState};
use crate::{Result, Tensor};
use ndarray::Array1;
use std::collections::BTreeMap;

/// AdamW optimizer
///
/// AdamW decouples weight decay from the gradient-based update, making it more
/// effective than L2 regularization. Instead of adding weight decay to the gradient,
/// it applies weight decay directly to the parameters.
///
/// Standard Adam with L2: θ_t = θ_{t-1} - lr * (m_t / (√v_t + ε) + λ * θ_{t-1})
/// AdamW: θ_t = (1 - lr * λ) * θ_{t-1} - lr * m_t / (√v_t + ε)
pub struct AdamW {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    weight_decay: f32,
    t: u64,
    m: Vec<Option<Array1<f32>>>, // First moment
    v: Vec<Option<Array1<f32>>>, // Second moment
}

impl AdamW {
    /// Create a new AdamW optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32, weight_decay: f32) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            epsilon,
            weight_decay,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    /// Create AdamW with default parameters (weight_decay = 0.01)
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8, 0.01)
    }

    #[must_use]
    pub fn beta1(&self) -> f32 {
        self.beta1
    }

    #[must_use]
    pub fn beta2(&self) -> f32 {
        self.beta2
    }

    #[must_use]
    pub fn weight_decay(&self) -> f32 {
        self.weight_decay
    }

    pub(crate) fn state_named(&self, name: &str) -> OptimizerState {
        let mut buffers = BTreeMap::new();
        buffers.insert("m".to_string(), to_buffers(&self.m));
        buffers.insert("v".to_string(), to_buffers(&self.v));
        OptimizerState {
            name: name.to_string(),
            lr: self.lr,
            step_count: self.t,
            buffers,
        }
    }

    pub(crate) fn load_state_named(&mut self, state: &OptimizerState, name: &str) -> Result<()> {
        state.check_name(name)?;
        self.lr = state.lr;
        self.t = state.step_count;
        self.m = from_buffers(state, "m");
        self.v = from_buffers(state, "v");
        Ok(())
    }
}

impl Optimizer for AdamW {
    fn step_refs(&mut self, params: &mut [&mut Tensor]) {
        if self.m.len() < params.len() {
            self.m.resize(params.len(), None);
            self.v.resize(params.len(), None);
        }
        self.t += 1;

        // Bias correction factors
        let lr_t = self.lr
            * ((1.0 - self.beta2.powi(self.t as i32)).sqrt()
                / (1.0 - self.beta1.powi(self.t as i32)));

        for (i, param) in params.iter_mut().enumerate() {
            let Some(grad) = param.grad() else { continue };

            // m_t = β1 * m_{t-1} + (1 - β1) * g
            let m_t = match &self.m[i] {
                Some(m) => m * self.beta1 + &grad * (1.0 - self.beta1),
                None => &grad * (1.0 - self.beta1),
            };

            // v_t = β2 * v_{t-1} + (1 - β2) * g²
            let grad_sq = &grad * &grad;
            let v_t = match &self.v[i] {
                Some(v) => v * self.beta2 + &grad_sq * (1.0 - self.beta2),
                None => &grad_sq * (1.0 - self.beta2),
            };

            // θ_t = (1 - lr * λ) * θ_{t-1} - lr_t * m_t / (√v_t + ε)
            let adaptive_update = &m_t / &(v_t.mapv(f32::sqrt) + self.epsilon) * lr_t;
            let weight_decay_factor = 1.0 - self.lr * self.weight_decay;
            let updated = param.data() * weight_decay_factor - &adaptive_update;
            *param.data_mut() = updated;

            self.m[i] = Some(m_t);
            self.v[i] = Some(v_t);
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn step_count(&self) -> u64 {
        self.t
    }

    fn state(&self) -> OptimizerState {
        self.state_named("adamw")
    }

    fn load_state(&mut self, state: &OptimizerState) -> Result<()> {
        self.load_state_named(state, "adamw")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn quadratic_step(opt: &mut AdamW, x: &mut Tensor) {
        // f(x) = x², ∇f = 2x
        let grad = x.data() * 2.0;
        x.set_grad(grad);
        opt.step_refs(&mut [x]);
    }

    #[test]
    fn test_adamw_quadratic_convergence() {
        let mut opt = AdamW::new(0.1, 0.9, 0.999, 1e-8, 0.0);
        let mut x = Tensor::from_vec(vec![5.0, -3.0], true);
        for _ in 0..300 {
            quadratic_step(&mut opt, &mut x);
        }
        for v in x.data().iter() {
            assert!(v.abs() < 0.1, "did not converge: {v}");
        }
        assert_eq!(opt.step_count(), 300);
    }

    #[test]
    fn test_adamw_weight_decay_shrinks_without_gradient_signal() {
        let mut opt = AdamW::new(0.1, 0.9, 0.999, 1e-8, 0.5);
        let mut x = Tensor::from_vec(vec![1.0], true);
        x.set_grad(Array1::zeros(1));
        opt.step_refs(&mut [&mut x]);
        // Only the decoupled decay applies: 1 * (1 - 0.1 * 0.5)
        assert_abs_diff_eq!(x.data()[0], 0.95, epsilon = 1e-6);
    }

    #[test]
    fn test_adamw_skips_params_without_grad() {
        let mut opt = AdamW::default_params(0.1);
        let mut x = Tensor::from_vec(vec![1.0, 2.0], true);
        opt.step_refs(&mut [&mut x]);
        assert_eq!(x.to_vec(), vec![1.0, 2.0]);
        assert_eq!(opt.step_count(), 1);
    }

    #[test]
    fn test_adamw_state_roundtrip() {
        let mut opt = AdamW::default_params(0.01);
        let mut x = Tensor::from_vec(vec![1.0, 2.0], true);
        quadratic_step(&mut opt, &mut x);

        let state = opt.state();
        let mut restored = AdamW::default_params(0.5);
        restored.load_state(&state).unwrap();

        assert_eq!(restored.step_count(), 1);
        assert_eq!(restored.lr(), 0.01);
        assert_eq!(restored.state(), state);
    }

    #[test]
    fn test_adamw_rejects_foreign_state() {
        let sgd_state = crate::optim::SGD::new(0.1, 0.0).state();
        let mut opt = AdamW::default_params(0.1);
        assert!(opt.load_state(&sgd_state).is_err());
    }
}
