//! Basic autograd operations: add, sub, mul, scale, add_scalar, sum, mean, mean_of

use crate::autograd::{tracks, BackwardOp, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Add two tensors
pub fn add(a: &Tensor, b: &Tensor) -> Tensor {
    assert_eq!(a.len(), b.len(), "add: length mismatch");
    let data = a.data() + b.data();
    let requires_grad = tracks(&[a, b]);

    let mut result = Tensor::new(data, requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(AddBackward {
            inputs: [a.clone(), b.clone()],
            sign_b: 1.0,
        }));
    }
    result
}

/// Subtract `b` from `a`
pub fn sub(a: &Tensor, b: &Tensor) -> Tensor {
    assert_eq!(a.len(), b.len(), "sub: length mismatch");
    let data = a.data() - b.data();
    let requires_grad = tracks(&[a, b]);

    let mut result = Tensor::new(data, requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(AddBackward {
            inputs: [a.clone(), b.clone()],
            sign_b: -1.0,
        }));
    }
    result
}

struct AddBackward {
    inputs: [Tensor; 2],
    sign_b: f32,
}

impl BackwardOp for AddBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        vec![Some(grad.clone()), Some(grad * self.sign_b)]
    }
}

/// Multiply two tensors element-wise
pub fn mul(a: &Tensor, b: &Tensor) -> Tensor {
    assert_eq!(a.len(), b.len(), "mul: length mismatch");
    let data = a.data() * b.data();
    let requires_grad = tracks(&[a, b]);

    let mut result = Tensor::new(data, requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(MulBackward {
            inputs: [a.clone(), b.clone()],
        }));
    }
    result
}

struct MulBackward {
    inputs: [Tensor; 2],
}

impl BackwardOp for MulBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        let [a, b] = &self.inputs;
        // ∂L/∂a = ∂L/∂out * b, ∂L/∂b = ∂L/∂out * a
        vec![Some(grad * b.data()), Some(grad * a.data())]
    }
}

/// Scale tensor by a scalar
pub fn scale(a: &Tensor, factor: f32) -> Tensor {
    let data = a.data() * factor;
    let requires_grad = tracks(&[a]);

    let mut result = Tensor::new(data, requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(ScaleBackward {
            inputs: [a.clone()],
            factor,
        }));
    }
    result
}

struct ScaleBackward {
    inputs: [Tensor; 1],
    factor: f32,
}

impl BackwardOp for ScaleBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        vec![Some(grad * self.factor)]
    }
}

/// Add a constant to every element
pub fn add_scalar(a: &Tensor, value: f32) -> Tensor {
    let data = a.data() + value;
    let requires_grad = tracks(&[a]);

    let mut result = Tensor::new(data, requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(ScaleBackward {
            inputs: [a.clone()],
            factor: 1.0,
        }));
    }
    result
}

/// Sum all elements
pub fn sum(a: &Tensor) -> Tensor {
    reduce(a, 1.0)
}

/// Mean of all elements (0 for an empty tensor)
pub fn mean(a: &Tensor) -> Tensor {
    let weight = if a.is_empty() { 0.0 } else { 1.0 / a.len() as f32 };
    reduce(a, weight)
}

fn reduce(a: &Tensor, weight: f32) -> Tensor {
    let data = Array1::from(vec![a.data().sum() * weight]);
    let requires_grad = tracks(&[a]);

    let mut result = Tensor::new(data, requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(ReduceBackward {
            inputs: [a.clone()],
            weight,
        }));
    }
    result
}

struct ReduceBackward {
    inputs: [Tensor; 1],
    weight: f32,
}

impl BackwardOp for ReduceBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        // ∂L/∂a_i = ∂L/∂sum * weight (broadcast)
        let len = self.inputs[0].len();
        vec![Some(Array1::from_elem(len, grad[0] * self.weight))]
    }
}

/// Element-wise mean of equally sized tensors
///
/// Used to average per-sample scores and losses over Monte-Carlo draws.
pub fn mean_of(tensors: &[Tensor]) -> Tensor {
    assert!(!tensors.is_empty(), "mean_of: need at least one tensor");
    let len = tensors[0].len();
    let weight = 1.0 / tensors.len() as f32;

    let mut data = Array1::zeros(len);
    for t in tensors {
        assert_eq!(t.len(), len, "mean_of: length mismatch");
        data += t.data();
    }
    data *= weight;

    let refs: Vec<&Tensor> = tensors.iter().collect();
    let requires_grad = tracks(&refs);

    let mut result = Tensor::new(data, requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(MeanOfBackward {
            inputs: tensors.to_vec(),
            weight,
        }));
    }
    result
}

struct MeanOfBackward {
    inputs: Vec<Tensor>,
    weight: f32,
}

impl BackwardOp for MeanOfBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        let shared = grad * self.weight;
        self.inputs.iter().map(|_| Some(shared.clone())).collect()
    }
}
