//! Activation functions: relu, tanh

use crate::autograd::{tracks, BackwardOp, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// ReLU activation: max(0, x)
pub fn relu(a: &Tensor) -> Tensor {
    let data = a.data().mapv(|x| x.max(0.0));
    let requires_grad = tracks(&[a]);

    let mut result = Tensor::new(data, requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(ReluBackward {
            inputs: [a.clone()],
        }));
    }
    result
}

struct ReluBackward {
    inputs: [Tensor; 1],
}

impl BackwardOp for ReluBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        // ∂relu/∂x = 1 if x > 0, else 0
        let input = self.inputs[0].data();
        let mask = input.mapv(|x| if x > 0.0 { 1.0 } else { 0.0 });
        vec![Some(grad * &mask)]
    }
}

/// Hyperbolic tangent
pub fn tanh(a: &Tensor) -> Tensor {
    let data = a.data().mapv(f32::tanh);
    let requires_grad = tracks(&[a]);

    let mut result = Tensor::new(data.clone(), requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(TanhBackward {
            inputs: [a.clone()],
            output: data,
        }));
    }
    result
}

struct TanhBackward {
    inputs: [Tensor; 1],
    output: Array1<f32>,
}

impl BackwardOp for TanhBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        // ∂tanh/∂x = 1 - tanh²(x)
        let local = self.output.mapv(|y| 1.0 - y * y);
        vec![Some(grad * &local)]
    }
}
